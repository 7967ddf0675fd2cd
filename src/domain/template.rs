//! Template engine: `{placeholder}` substitution against a customer record.
//!
//! Rendering degrades gracefully: a recognized placeholder whose value is
//! absent or empty becomes the empty string rather than failing the
//! dispatch. Unrecognized placeholders are left verbatim so authoring
//! mistakes stay visible in the output instead of silently disappearing.

use thiserror::Error;

use super::customer::Customer;

/// The closed set of recognized placeholders and the customer field each
/// resolves to. `{phone}` maps to the contact address.
pub const RECOGNIZED_PLACEHOLDERS: [&str; 5] = [
    "first_name",
    "last_name",
    "location",
    "preferred_product",
    "phone",
];

/// Template syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template cannot be empty")]
    Empty,
    #[error("template has unbalanced braces: {open} open, {close} close")]
    UnbalancedBraces { open: usize, close: usize },
}

fn substitute(rendered: String, placeholder: &str, value: Option<&str>) -> String {
    let needle = format!("{{{placeholder}}}");
    let replacement = value.filter(|v| !v.is_empty()).unwrap_or("");
    rendered.replace(&needle, replacement)
}

/// Render a template against a customer record.
///
/// Every occurrence of every recognized placeholder is substituted with the
/// customer's value when present and non-empty, otherwise with the empty
/// string. Unrecognized placeholders appear verbatim in the output. The
/// result is a pure function of its inputs.
pub fn render(template: &str, customer: &Customer) -> Result<String, TemplateError> {
    if template.is_empty() {
        return Err(TemplateError::Empty);
    }

    let mut rendered = template.to_owned();
    rendered = substitute(rendered, "first_name", customer.first_name.as_deref());
    rendered = substitute(rendered, "last_name", customer.last_name.as_deref());
    rendered = substitute(rendered, "location", customer.location.as_deref());
    rendered = substitute(
        rendered,
        "preferred_product",
        customer.preferred_product.as_deref(),
    );
    rendered = substitute(rendered, "phone", Some(customer.phone.as_str()));

    Ok(rendered)
}

/// Validate template syntax.
///
/// Fails when the template is empty or the `{`/`}` counts differ. Unknown
/// placeholders pass validation; they simply render verbatim.
pub fn validate(template: &str) -> Result<(), TemplateError> {
    if template.is_empty() {
        return Err(TemplateError::Empty);
    }

    let open = template.matches('{').count();
    let close = template.matches('}').count();
    if open != close {
        return Err(TemplateError::UnbalancedBraces { open, close });
    }

    Ok(())
}

/// Extract every `{identifier}` occurrence from a template, recognized or
/// not, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let identifier = &after[..end];
                if !identifier.is_empty()
                    && identifier
                        .chars()
                        .all(|c| c.is_ascii_alphabetic() || c == '_')
                {
                    found.push(identifier);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn customer() -> Customer {
        Customer {
            id: 1,
            phone: "+254700000001".into(),
            first_name: Some("Alice".into()),
            last_name: Some("Wanjiku".into()),
            location: Some("Nairobi".into()),
            preferred_product: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_present_fields() {
        let out = render("Hi {first_name} {last_name} from {location}!", &customer())
            .expect("renders");
        assert_eq!(out, "Hi Alice Wanjiku from Nairobi!");
    }

    #[test]
    fn missing_and_empty_fields_become_empty_strings() {
        let mut c = customer();
        c.first_name = None;
        c.last_name = Some(String::new());
        let out = render("Hi {first_name}{last_name}!", &c).expect("renders");
        assert_eq!(out, "Hi !");
    }

    #[test]
    fn all_occurrences_are_substituted() {
        let out = render("{first_name}, yes {first_name}!", &customer()).expect("renders");
        assert_eq!(out, "Alice, yes Alice!");
    }

    #[test]
    fn unrecognized_placeholders_stay_verbatim() {
        let out = render("{unknown_field}", &customer()).expect("renders");
        assert_eq!(out, "{unknown_field}");
    }

    #[test]
    fn phone_maps_to_the_contact_address() {
        let out = render("Reply to {phone}", &customer()).expect("renders");
        assert_eq!(out, "Reply to +254700000001");
    }

    #[test]
    fn rendering_is_pure() {
        let c = customer();
        let first = render("Hi {first_name}!", &c).expect("renders");
        let second = render("Hi {first_name}!", &c).expect("renders");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_template_is_rejected() {
        assert_eq!(render("", &customer()), Err(TemplateError::Empty));
        assert_eq!(validate(""), Err(TemplateError::Empty));
    }

    #[rstest]
    #[case("Hi {first_name}!", true)]
    #[case("no placeholders", true)]
    #[case("{unknown} is fine", true)]
    #[case("Hi {first_name!", false)]
    #[case("}{", true)]
    #[case("{{first_name}", false)]
    fn validate_checks_brace_balance(#[case] template: &str, #[case] ok: bool) {
        assert_eq!(validate(template).is_ok(), ok);
    }

    #[test]
    fn placeholders_extracts_identifiers_in_order() {
        let found = placeholders("Hi {first_name}, try {preferred_product} near {location}");
        assert_eq!(found, vec!["first_name", "preferred_product", "location"]);
    }

    #[test]
    fn placeholders_skips_non_identifier_braces() {
        assert!(placeholders("{} {123} {a-b}").is_empty());
    }
}
