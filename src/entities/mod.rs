pub mod contact;
pub mod invoice;
