pub mod qr;
pub mod web;
