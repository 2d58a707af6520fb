//! Address book client.

use crate::api::StorefrontApi;
use crate::checkout::address::{Address, AddressForm};
use crate::error::CommerceError;
use crate::ids::AddressId;

/// The user's saved addresses and the one selected for checkout.
///
/// Failed calls never change the book.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from already fetched addresses and pick a selection.
    pub fn from_addresses(addresses: Vec<Address>) -> Self {
        let mut book = Self::new();
        book.replace(addresses);
        book
    }

    /// Fetch the addresses again.
    ///
    /// The current selection is kept if it still exists; otherwise the
    /// default address is selected, otherwise the first one.
    pub async fn refresh(&mut self, api: &StorefrontApi) -> Result<&[Address], CommerceError> {
        let addresses = api.list_addresses().await?;
        tracing::debug!(count = addresses.len(), "addresses loaded");
        self.replace(addresses);
        Ok(&self.addresses)
    }

    /// Validate `form`, save it, and select the new address.
    ///
    /// Invalid input is rejected before any request is made.
    pub async fn create(
        &mut self,
        api: &StorefrontApi,
        form: &AddressForm,
    ) -> Result<&Address, CommerceError> {
        let form = form.trimmed();
        form.validate()?;

        let created = api.create_address(&form).await?;
        tracing::info!(address_id = %created.id, "address created");

        if created.is_default {
            for address in &mut self.addresses {
                address.is_default = false;
            }
        }
        self.selected = Some(created.id.clone());
        self.addresses.push(created);

        let index = self.addresses.len() - 1;
        Ok(&self.addresses[index])
    }

    /// All known addresses.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// The address marked default, or the first one.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }

    /// Selected id, even if it no longer resolves.
    pub fn selected_id(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    /// The selected address, if it is still in the book.
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.selected.as_ref()?;
        self.find(id)
    }

    /// Select an address. Returns false, leaving the selection alone, when
    /// `id` is not in the book.
    pub fn select(&mut self, id: &AddressId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn find(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    fn replace(&mut self, addresses: Vec<Address>) {
        self.addresses = addresses;
        let keep = self
            .selected
            .as_ref()
            .is_some_and(|id| self.find(id).is_some());
        if !keep {
            self.selected = self.default_address().map(|a| a.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::address::AddressType;
    use crate::money::Currency;
    use serde_json::json;
    use shop_data::{FetchClient, RecordingTransport};
    use std::sync::Arc;

    fn address(id: &str, is_default: bool) -> Address {
        Address {
            id: AddressId::new(id),
            name: "Jane".to_string(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62701".to_string(),
            country: "US".to_string(),
            phone: "555-0100".to_string(),
            address_type: AddressType::Home,
            is_default,
        }
    }

    fn api(transport: &Arc<RecordingTransport>) -> StorefrontApi {
        StorefrontApi::new(FetchClient::new(Arc::clone(transport)), Currency::USD)
    }

    fn form() -> AddressForm {
        AddressForm {
            name: "Jane".to_string(),
            street: "9 Elm St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip: "62702".to_string(),
            country: "US".to_string(),
            phone: "555-0199".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_selection_prefers_default() {
        let book = AddressBook::from_addresses(vec![address("1", false), address("2", true)]);
        assert_eq!(book.selected_id(), Some(&AddressId::new("2")));
    }

    #[test]
    fn test_selection_falls_back_to_first() {
        let book = AddressBook::from_addresses(vec![address("1", false), address("2", false)]);
        assert_eq!(book.selected_address().map(|a| a.id.as_str()), Some("1"));
    }

    #[test]
    fn test_empty_book_has_no_selection() {
        let book = AddressBook::from_addresses(Vec::new());
        assert!(book.is_empty());
        assert!(book.selected_address().is_none());
    }

    #[test]
    fn test_select_unknown_id() {
        let mut book = AddressBook::from_addresses(vec![address("1", false)]);
        assert!(!book.select(&AddressId::new("9")));
        assert_eq!(book.selected_id(), Some(&AddressId::new("1")));
    }

    #[tokio::test]
    async fn test_refresh_keeps_resolvable_selection() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"addresses": [address("1", true), address("2", false)]}));
        transport.push_json(200, json!([address("1", true)]));
        let api = api(&transport);

        let mut book = AddressBook::new();
        book.refresh(&api).await.unwrap();
        assert!(book.select(&AddressId::new("2")));

        book.refresh(&api).await.unwrap();
        assert_eq!(book.selected_id(), Some(&AddressId::new("1")));
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let transport = Arc::new(RecordingTransport::new());
        let mut book = AddressBook::new();

        let mut bad = form();
        bad.zip = "1".to_string();
        let err = book.create(&api(&transport), &bad).await.unwrap_err();

        assert!(matches!(err, CommerceError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
        assert!(book.is_empty());
    }

    #[tokio::test]
    async fn test_create_selects_new_address() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(201, json!({"address": address("3", false)}));
        let mut book = AddressBook::from_addresses(vec![address("1", true)]);

        let created = book.create(&api(&transport), &form()).await.unwrap();
        assert_eq!(created.id.as_str(), "3");
        assert_eq!(book.selected_id(), Some(&AddressId::new("3")));
        assert_eq!(book.addresses().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_book() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(500, json!({"message": "Database unavailable"}));
        let mut book = AddressBook::from_addresses(vec![address("1", true)]);

        let err = book.create(&api(&transport), &form()).await.unwrap_err();
        assert_eq!(err.user_message(), "Database unavailable");
        assert_eq!(book.addresses().len(), 1);
        assert_eq!(book.selected_id(), Some(&AddressId::new("1")));
    }
}
