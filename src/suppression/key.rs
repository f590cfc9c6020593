//! Suppression key derivation.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::models::DeliveryFields;

/// Stable identifier of one logical notification.
///
/// Two sends map to the same key when they target the same backend with the
/// same message and the same merged delivery fields. The interval is not part
/// of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuppressionKey(String);

impl SuppressionKey {
    /// Derive the key as `{prefix}:{sha256-hex}`.
    ///
    /// Every component is length-prefixed before hashing so that moving
    /// characters between adjacent fields changes the digest.
    pub fn derive(prefix: &str, message: &str, fields: &DeliveryFields) -> Self {
        let mut hasher = Sha256::new();
        update_part(&mut hasher, fields.kind().as_str());
        update_part(&mut hasher, message);

        for (name, value) in fields.rendered_fields() {
            update_part(&mut hasher, name);
            update_part(&mut hasher, value);
        }

        Self(format!("{}:{:x}", prefix, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn update_part(hasher: &mut Sha256, part: &str) {
    hasher.update((part.len() as u64).to_le_bytes());
    hasher.update(part.as_bytes());
}

impl fmt::Display for SuppressionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SuppressionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailFields, PushoverFields};
    use proptest::prelude::*;

    fn pushover(title: Option<&str>) -> DeliveryFields {
        DeliveryFields::Pushover(PushoverFields {
            app_token: "A".to_string(),
            api_key: "K".to_string(),
            title: title.map(str::to_string),
        })
    }

    #[test]
    fn test_key_format() {
        let key = SuppressionKey::derive("sendnotification", "hi", &pushover(None));
        let (prefix, digest) = key.as_str().split_once(':').unwrap();
        assert_eq!(prefix, "sendnotification");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_depends_on_message() {
        let a = SuppressionKey::derive("p", "disk full", &pushover(None));
        let b = SuppressionKey::derive("p", "disk ok", &pushover(None));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_depends_on_fields() {
        let a = SuppressionKey::derive("p", "hi", &pushover(None));
        let b = SuppressionKey::derive("p", "hi", &pushover(Some("Backup")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_depends_on_backend() {
        let email = DeliveryFields::Email(EmailFields {
            to: "A".to_string(),
            subject: "K".to_string(),
            sender: None,
        });
        let a = SuppressionKey::derive("p", "hi", &pushover(None));
        let b = SuppressionKey::derive("p", "hi", &email);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_field_boundaries() {
        let a = DeliveryFields::Pushover(PushoverFields {
            app_token: "ab".to_string(),
            api_key: "c".to_string(),
            title: None,
        });
        let b = DeliveryFields::Pushover(PushoverFields {
            app_token: "a".to_string(),
            api_key: "bc".to_string(),
            title: None,
        });
        assert_ne!(
            SuppressionKey::derive("p", "hi", &a),
            SuppressionKey::derive("p", "hi", &b)
        );
    }

    proptest! {
        #[test]
        fn prop_key_is_deterministic(message in ".{1,64}", title in proptest::option::of("[a-z ]{1,16}")) {
            let fields = pushover(title.as_deref());
            let first = SuppressionKey::derive("sendnotification", &message, &fields);
            let second = SuppressionKey::derive("sendnotification", &message, &fields.clone());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_key_keeps_prefix(prefix in "[a-z]{1,12}", message in ".{1,32}") {
            let key = SuppressionKey::derive(&prefix, &message, &pushover(None));
            let expected = format!("{}:", prefix);
            prop_assert!(key.as_str().starts_with(&expected));
        }
    }
}
