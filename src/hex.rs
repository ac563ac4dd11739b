//! Parsing of the hex USB identifiers supplied by the user
use crate::constants::HEX_PREFIXES;
use crate::error::{Error, FormatKind};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use std::fmt;

/// Parses a hex token, such as `0x1234`, `0X1234` or `1234`, into a u16.
///
/// 0 is a valid result - VID and PID 0x0000 exist on some buses - so
/// failures are always reported as an [`Error::Format`].
///
/// # Arguments
/// * `token` - The text to parse
///
/// # Returns
/// * `Ok(u16)` - The parsed value
/// * `Err(Error::Format)` - If the token is empty, contains anything other
///   than hex digits after the optional prefix, or is larger than 0xffff
pub fn parse_hex_u16(token: &str) -> Result<u16, Error> {
    trace!("parse_hex_u16 token {token:?}");

    let (offset, digits) = HEX_PREFIXES
        .iter()
        .find_map(|prefix| token.strip_prefix(prefix).map(|rest| (prefix.len(), rest)))
        .unwrap_or((0, token));

    let format_err = |kind| Error::Format {
        token: token.to_string(),
        kind,
    };

    if digits.is_empty() {
        return Err(format_err(FormatKind::Empty));
    }

    let mut value: u32 = 0;
    for (index, c) in digits.char_indices() {
        let digit = c.to_digit(16).ok_or_else(|| {
            format_err(FormatKind::InvalidDigit {
                position: offset + index,
                found: c,
            })
        })?;
        value = (value << 4) | digit;
        if value > u32::from(u16::MAX) {
            // Carry on checking so a bad character is reported in
            // preference to the overflow
            if let Some((position, found)) = digits
                .char_indices()
                .skip_while(|(i, _)| *i <= index)
                .find(|(_, c)| !c.is_ascii_hexdigit())
            {
                return Err(format_err(FormatKind::InvalidDigit {
                    position: offset + position,
                    found,
                }));
            }
            return Err(format_err(FormatKind::Overflow));
        }
    }

    trace!("Parsed {token:?} as 0x{value:04x}");
    Ok(value as u16)
}

/// The vendor and product identifier pair used to pick a USB device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    vendor_id: u16,
    product_id: u16,
}

impl DeviceId {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// Parses both tokens with [`parse_hex_u16`].  The vendor token is parsed
    /// first, and its error returned if both are bad.
    pub fn parse(vendor: &str, product: &str) -> Result<Self, Error> {
        let vendor_id = parse_hex_u16(vendor)?;
        let product_id = parse_hex_u16(product)?;
        Ok(Self::new(vendor_id, product_id))
    }

    pub const fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub const fn product_id(&self) -> u16 {
        self.product_id
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}
