//! Sign-in, sign-out and profile commands.

use anyhow::{bail, Result};
use dialoguer::Input;
use shop_commerce::api::{AuthGrant, ProfileUpdate};
use shop_commerce::ids::UserId;
use shop_commerce::session::{SessionEvent, UserProfile};

use super::{LoginArgs, ProfileArgs};
use crate::context::Context;

/// Run the login command.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let session = ctx.session(&store);
    let api = ctx.api(None)?;
    let mut events = session.events().subscribe();

    let grant = match (args.phone, args.google, args.token) {
        (Some(phone), _, _) => {
            let spinner = ctx.output.spinner("Sending code...");
            let sent = api.send_otp(&phone).await;
            spinner.finish_and_clear();
            sent?;

            let otp: String = Input::new()
                .with_prompt(format!("Code sent to {}", phone))
                .interact_text()?;
            api.verify_otp(&phone, otp.trim()).await?
        }
        (None, Some(credential), _) => api.google_login(&credential).await?,
        (None, None, Some(token)) => AuthGrant {
            token,
            user: UserProfile {
                id: UserId::new(args.user_id.unwrap_or_default()),
                name: None,
                email: None,
                phone: None,
            },
        },
        (None, None, None) => bail!("Pass one of --phone, --google or --token"),
    };

    session.login(&grant)?;
    if let Ok(SessionEvent::LoggedIn { user_id }) = events.try_recv() {
        ctx.output.debug(&format!("session event: signed in as {}", user_id));
    }

    if ctx.output.is_json() {
        ctx.output.json(&grant.user);
        return Ok(());
    }

    let who = grant
        .user
        .name
        .clone()
        .unwrap_or_else(|| grant.user.id.to_string());
    ctx.output.success(&format!("Signed in as {}", who));
    if !grant.user.is_complete() {
        ctx.output
            .warn("Your profile is missing a name or email. Update it with `shop profile`.");
    }
    Ok(())
}

/// Run the logout command.
pub async fn logout(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let session = ctx.session(&store);

    if !session.is_authenticated()? {
        ctx.output.info("Not signed in");
    }
    session.logout()?;
    ctx.output.success("Signed out. Your cart was kept.");
    Ok(())
}

/// Run the profile command: show the cached profile, or update it.
pub async fn profile(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let session = ctx.session(&store);

    if !session.is_authenticated()? {
        bail!("Not signed in. Run `shop login` first.");
    }

    let update = ProfileUpdate {
        name: args.name,
        email: args.email,
        phone: args.phone,
    };

    let profile = if update == ProfileUpdate::default() {
        match session.profile() {
            Some(profile) => profile,
            None => bail!("No cached profile. Sign in again to refresh it."),
        }
    } else {
        let api = ctx.authed_api(&session)?;
        let profile = api.update_profile(&update).await?;
        session.store_profile(&profile)?;
        ctx.output.success("Profile updated");
        profile
    };

    if ctx.output.is_json() {
        ctx.output.json(&profile);
        return Ok(());
    }

    ctx.output.header("Profile");
    ctx.output.kv("id", profile.id.as_str());
    ctx.output.kv("name", profile.name.as_deref().unwrap_or("-"));
    ctx.output.kv("email", profile.email.as_deref().unwrap_or("-"));
    ctx.output.kv("phone", profile.phone.as_deref().unwrap_or("-"));
    if !profile.is_complete() {
        ctx.output.warn("Profile incomplete: add a name and email to check out smoothly");
    }
    Ok(())
}
