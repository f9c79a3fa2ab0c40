pub mod dates;
pub mod hash;
pub mod html;
pub mod jwt;
pub mod notice;
