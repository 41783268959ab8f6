//! Display formatting for listing values.

use crate::models::Listing;

/// Price in Brazilian reais: `R$ 45.000,00`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}R$ {},{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Odometer reading with dot thousands separators: `45.000`.
pub fn format_km(km: u64) -> String {
    group_thousands(km)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// WhatsApp contact link for the listing's phone with a prefilled message.
pub fn whatsapp_link(listing: &Listing) -> String {
    let text = format!(
        "Hi! I saw the {} listing on WebCarros and I'm interested.",
        listing.name
    );
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("phone", &listing.phone)
        .append_pair("text", &text)
        .finish();
    format!("https://api.whatsapp.com/send?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(45000.0), "R$ 45.000,00");
        assert_eq!(format_brl(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_brl(0.5), "R$ 0,50");
        assert_eq!(format_brl(999.0), "R$ 999,00");
    }

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(45000), "45.000");
        assert_eq!(format_km(0), "0");
        assert_eq!(format_km(1000000), "1.000.000");
    }

    #[test]
    fn test_whatsapp_link() {
        let listing = crate::Listing {
            id: "c1".into(),
            name: "ONIX".into(),
            model: "LT".into(),
            description: String::new(),
            year: 2019,
            price: 1.0,
            city: "X".into(),
            odometer_km: 1,
            phone: "11987654321".into(),
            owner: Identity::new("u1", None, None),
            photos: vec![],
            created: None,
        };
        let link = whatsapp_link(&listing);
        assert!(link.starts_with("https://api.whatsapp.com/send?phone=11987654321&text="));
        assert!(link.contains("ONIX"));
        assert!(!link.contains(' '));
    }
}
