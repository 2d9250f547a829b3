pub mod paypal;
