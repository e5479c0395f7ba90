//! Address checks and masking for the address a code was sent to.

use regex::Regex;

const MASK: char = '*';

/// Loose shape check: something, `@`, something with a dot.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Masks the local part of an email address, keeping the domain readable.
///
/// `user@example.com` becomes `u**r@example.com`. Short local parts never reveal
/// every character: two characters keep only the first (`ab@x.com` ->
/// `a*@x.com`), one character is fully masked (`a@x.com` -> `*@x.com`). Input
/// without a usable local part is masked entirely.
#[must_use]
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return mask_all(email);
    };

    let chars: Vec<char> = local.chars().collect();
    let masked_local: String = match chars.as_slice() {
        [] => return mask_all(email),
        [_] => MASK.to_string(),
        [first, _] => [*first, MASK].iter().collect(),
        [first, middle @ .., last] => std::iter::once(*first)
            .chain(middle.iter().map(|_| MASK))
            .chain(std::iter::once(*last))
            .collect(),
    };

    format!("{masked_local}@{domain}")
}

fn mask_all(value: &str) -> String {
    value.chars().map(|_| MASK).collect()
}

#[cfg(test)]
mod tests {
    use super::{mask_email, valid_email};

    #[test]
    fn valid_email_accepts_common_addresses() {
        assert!(valid_email("user@example.com"));
        assert!(valid_email("a.b+c@sub.example.io"));
    }

    #[test]
    fn valid_email_rejects_malformed_addresses() {
        for email in ["", "user", "user@", "@example.com", "user@example", "us er@example.com"] {
            assert!(!valid_email(email), "accepted {email:?}");
        }
    }

    #[test]
    fn masks_middle_of_local_part() {
        assert_eq!(mask_email("user@example.com"), "u**r@example.com");
        assert_eq!(mask_email("abc@x.com"), "a*c@x.com");
        assert_eq!(
            mask_email("accounts.payable@invoicepro.io"),
            "a**************e@invoicepro.io"
        );
    }

    #[test]
    fn two_character_local_part_keeps_first() {
        assert_eq!(mask_email("ab@x.com"), "a*@x.com");
    }

    #[test]
    fn one_character_local_part_is_fully_masked() {
        assert_eq!(mask_email("a@x.com"), "*@x.com");
    }

    #[test]
    fn missing_local_part_or_separator_masks_everything() {
        assert_eq!(mask_email("@x.com"), "******");
        assert_eq!(mask_email("nobody"), "******");
        assert_eq!(mask_email(""), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(mask_email("ñandú@x.com"), "ñ***ú@x.com");
    }
}
