use anyhow::{anyhow, Result};

/// Minimal name validation: at least two characters after trimming.
/// No upper bound and no charset restriction.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.chars().count() < 2 {
        return Err(anyhow!("Имя слишком короткое"));
    }

    Ok(name.to_string())
}

/// Normalizes a phone number: strips everything except digits and a leading
/// `+`, requires at least 10 digits. Returns the cleaned number.
pub fn validate_phone(phone: &str) -> Option<String> {
    let mut clean = String::new();
    for (i, c) in phone.chars().enumerate() {
        if c.is_ascii_digit() || (c == '+' && i == 0) {
            clean.push(c);
        } else if !matches!(c, ' ' | '-' | '(' | ')' | '.') {
            return None;
        }
    }

    let digits = clean.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= 10 {
        Some(clean)
    } else {
        None
    }
}

/// Basic email shape check: `local@domain.tld`.
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Delivery addresses must carry enough detail to ship to.
pub fn validate_address(address: &str) -> Result<String> {
    let address = address.trim();

    if address.chars().count() < 10 {
        return Err(anyhow!("Адрес слишком короткий"));
    }

    Ok(address.to_string())
}

/// Wall-clock post slot in `HH:MM`, minute resolution.
pub fn validate_slot_time(time: &str) -> bool {
    let Some((h, m)) = time.split_once(':') else {
        return false;
    };
    let (Ok(h), Ok(m)) = (h.parse::<u32>(), m.parse::<u32>()) else {
        return false;
    };
    h < 24 && m < 60 && time.len() == 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_valid() {
        assert_eq!(validate_name("Alice").unwrap(), "Alice");
        assert_eq!(validate_name("  Bob  ").unwrap(), "Bob");
        // Two characters is the documented minimum
        assert_eq!(validate_name("Al").unwrap(), "Al");
        // No charset restriction
        assert!(validate_name("Яна 🌸").is_ok());
    }

    #[test]
    fn test_validate_name_too_short() {
        assert!(validate_name("").is_err());
        assert!(validate_name("A").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(" X ").is_err());
    }

    #[test]
    fn test_validate_phone_valid() {
        assert_eq!(
            validate_phone("+998 90 123 45 67").as_deref(),
            Some("+998901234567")
        );
        assert_eq!(
            validate_phone("8 (900) 123-45-67").as_deref(),
            Some("89001234567")
        );
    }

    #[test]
    fn test_validate_phone_invalid() {
        assert!(validate_phone("12345").is_none());
        assert!(validate_phone("call me maybe").is_none());
        assert!(validate_phone("").is_none());
        // plus sign only allowed in front
        assert!(validate_phone("99890+1234567").is_none());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("first.last+tag@mail.example.org"));
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@domain"));
        assert!(!validate_email("user@domain.c0m"));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("ул. Навои, д. 15, кв. 3").is_ok());
        assert!(validate_address("дом 5").is_err());
        assert!(validate_address("").is_err());
    }

    #[test]
    fn test_validate_slot_time() {
        assert!(validate_slot_time("09:00"));
        assert!(validate_slot_time("23:59"));
        assert!(!validate_slot_time("24:00"));
        assert!(!validate_slot_time("9:00"));
        assert!(!validate_slot_time("09:60"));
        assert!(!validate_slot_time("0900"));
    }
}
