//! Configuration access port trait.

use rust_decimal::Decimal;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Decimal value, `None` when the key is missing or not a number.
    fn get_decimal(&self, section: &str, key: &str) -> Option<Decimal>;

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// All keys of a section, sorted; empty when the section is absent.
    fn section_keys(&self, section: &str) -> Vec<String>;
}
