//! Checkout module.
//!
//! Contains addresses and the address book, the order model and its lenient
//! wire decoding, the order submission workflow, and order history.

mod address;
mod address_book;
mod decode;
mod flow;
mod history;
mod order;

pub use address::{Address, AddressForm, AddressType};
pub use address_book::AddressBook;
pub use decode::{
    decode_shipping_address, decode_variant, lenient_amount, lenient_string, null_as_default,
    parse_timestamp, LenientField, OrderLineRecord, OrderRecord,
};
pub use flow::{
    check_preconditions, CheckoutDetails, CheckoutFlow, NewOrderLine, NewOrderRequest,
    SubmissionState,
};
pub use history::{OrderDetailView, OrderHistory};
pub use order::{
    Order, OrderLine, OrderStats, OrderStatus, PaymentMethod, ShippingAddress, NOT_AVAILABLE,
    RETURN_WINDOW_DAYS,
};
