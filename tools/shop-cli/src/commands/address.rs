//! Address book commands.

use anyhow::{bail, Result};
use dialoguer::Input;
use shop_commerce::checkout::{Address, AddressBook, AddressForm, AddressType};

use super::{AddressArgs, AddressCommand, AddressFields};
use crate::context::Context;

/// Run the address command.
pub async fn run(args: AddressArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(AddressCommand::List) {
        AddressCommand::List => list(ctx).await,
        AddressCommand::Add(fields) => add(fields, ctx).await,
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let api = ctx.authed_api(&ctx.session(&store))?;

    let spinner = ctx.output.spinner("Loading addresses...");
    let mut book = AddressBook::new();
    let loaded = book.refresh(&api).await;
    spinner.finish_and_clear();
    loaded?;

    if ctx.output.is_json() {
        ctx.output.json(&book.addresses());
        return Ok(());
    }

    ctx.output.header("Saved Addresses");
    if book.is_empty() {
        ctx.output.info("No saved addresses. Add one with `shop address add`.");
        return Ok(());
    }

    for address in book.addresses() {
        ctx.output.list_item(&describe(address));
    }
    Ok(())
}

async fn add(fields: AddressFields, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let api = ctx.authed_api(&ctx.session(&store))?;
    let form = build_form(fields, !ctx.output.is_json())?;

    let spinner = ctx.output.spinner("Saving address...");
    let mut book = AddressBook::new();
    let created = book.create(&api, &form).await.cloned();
    spinner.finish_and_clear();
    let created = created?;

    if ctx.output.is_json() {
        ctx.output.json(&created);
        return Ok(());
    }

    ctx.output.success(&format!("Saved address {}", created.id));
    ctx.output.text(&indent(&created.multi_line()));
    Ok(())
}

/// One-line description for listings.
pub fn describe(address: &Address) -> String {
    let mut text = format!(
        "[{}] {} ({}), {}",
        address.id,
        address.name,
        address.address_type.as_str(),
        address.one_line()
    );
    if address.is_default {
        text.push_str(" - default");
    }
    text
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {}\n", line)).collect()
}

fn parse_kind(kind: &str) -> Result<AddressType> {
    match kind.trim().to_lowercase().as_str() {
        "home" => Ok(AddressType::Home),
        "work" => Ok(AddressType::Work),
        "other" => Ok(AddressType::Other),
        other => bail!("Unknown address type '{}' (expected home, work or other)", other),
    }
}

/// Fill in missing fields, prompting when `interactive`.
fn build_form(fields: AddressFields, interactive: bool) -> Result<AddressForm> {
    let field = |value: Option<String>, prompt: &str| -> Result<String> {
        match value {
            Some(value) => Ok(value),
            None if interactive => Ok(Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?),
            None => Ok(String::new()),
        }
    };

    Ok(AddressForm {
        name: field(fields.name, "Full name")?,
        street: field(fields.street, "Street")?,
        city: field(fields.city, "City")?,
        state: field(fields.state, "State")?,
        zip: field(fields.zip, "ZIP / postal code")?,
        country: field(fields.country, "Country")?,
        phone: field(fields.phone, "Phone")?,
        address_type: parse_kind(&fields.kind)?,
        is_default: fields.default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_commerce::ids::AddressId;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("Work").unwrap(), AddressType::Work);
        assert!(parse_kind("office").is_err());
    }

    #[test]
    fn test_build_form_without_prompts() {
        let fields = AddressFields {
            name: Some("Jane".to_string()),
            street: None,
            city: Some("Springfield".to_string()),
            state: None,
            zip: Some("62701".to_string()),
            country: None,
            phone: None,
            kind: "home".to_string(),
            default: true,
        };

        let form = build_form(fields, false).unwrap();
        assert_eq!(form.name, "Jane");
        assert!(form.street.is_empty());
        assert!(form.is_default);
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_describe_marks_default() {
        let address = Address {
            id: AddressId::new("4"),
            name: "Jane".to_string(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: String::new(),
            phone: String::new(),
            address_type: AddressType::Home,
            is_default: true,
        };
        assert_eq!(
            describe(&address),
            "[4] Jane (home), 1 Main St, Springfield, IL, 62701 - default"
        );
    }
}
