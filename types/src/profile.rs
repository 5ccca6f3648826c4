//! Account profile fields.

use crate::error::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque content-addressed blob reference (an IPFS hash in practice).
///
/// The contract never dereferences it; it only checks that it is a single
/// non-empty token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueError> {
        let s = raw.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ValueError::ContentHash(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ValueError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Date of birth packed as `YYYYMMDD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DateOfBirth(u32);

impl DateOfBirth {
    pub fn new(yyyymmdd: u32) -> Result<Self, ValueError> {
        let year = yyyymmdd / 10_000;
        let month = (yyyymmdd / 100) % 100;
        let day = yyyymmdd % 100;
        if !(1900..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return Err(ValueError::DateOfBirth(yyyymmdd));
        }
        Ok(Self(yyyymmdd))
    }

    pub fn year(&self) -> u32 {
        self.0 / 10_000
    }

    pub fn month(&self) -> u32 {
        (self.0 / 100) % 100
    }

    pub fn day(&self) -> u32 {
        self.0 % 100
    }

    pub fn packed(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DateOfBirth {
    type Error = ValueError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<DateOfBirth> for u32 {
    fn from(d: DateOfBirth) -> Self {
        d.0
    }
}

impl fmt::Display for DateOfBirth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// Postal address, carried on the wire as `street:city:country:postal_code`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl FromStr for PostalAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [street, city, country, postal_code]
                if parts.iter().all(|p| !p.is_empty()) =>
            {
                Ok(Self {
                    street: street.to_string(),
                    city: city.to_string(),
                    country: country.to_string(),
                    postal_code: postal_code.to_string(),
                })
            }
            _ => Err(ValueError::PostalAddress(s.to_string())),
        }
    }
}

impl fmt::Display for PostalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.street, self.city, self.country, self.postal_code
        )
    }
}

/// Profile fields of an account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<DateOfBirth>,
    #[serde(default)]
    pub address: Option<PostalAddress>,
}

impl Profile {
    /// Check every populated field.
    pub fn validate(&self) -> Result<(), ValueError> {
        validate_display_name(&self.display_name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

pub fn validate_display_name(name: &str) -> Result<(), ValueError> {
    if name.trim().is_empty() {
        return Err(ValueError::EmptyName);
    }
    Ok(())
}

/// Exactly one `@` with something on both sides, and no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValueError> {
    let ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ValueError::Email(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_of_birth_bounds() {
        let dob = DateOfBirth::new(19900415).unwrap();
        assert_eq!((dob.year(), dob.month(), dob.day()), (1990, 4, 15));
        assert_eq!(dob.to_string(), "1990-04-15");
        assert!(DateOfBirth::new(19901315).is_err());
        assert!(DateOfBirth::new(19900400).is_err());
        assert!(DateOfBirth::new(18991231).is_err());
    }

    #[test]
    fn postal_address_needs_four_fields() {
        let addr: PostalAddress = "1 Main St:Springfield:US:12345".parse().unwrap();
        assert_eq!(addr.city, "Springfield");
        assert_eq!(addr.to_string(), "1 Main St:Springfield:US:12345");
        assert!("1 Main St:Springfield:US".parse::<PostalAddress>().is_err());
        assert!("a:b::d".parse::<PostalAddress>().is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        for bad in ["", "alice", "@example.com", "alice@", "a@b@c", "a lice@x.io"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn content_hash_is_single_token() {
        assert!(ContentHash::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").is_ok());
        assert!(ContentHash::new("").is_err());
        assert!(ContentHash::new("two words").is_err());
    }
}
