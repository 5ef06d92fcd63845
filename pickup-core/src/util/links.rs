use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters that are escaped in a single query value.
///
/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[must_use]
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Appends the encoded query to the search base URL,
/// e.g. `https://www.google.com/maps/search/?api=1&query=`.
#[must_use]
pub fn map_search_url(base: &str, query: &str) -> String {
    format!("{base}{}", encode_query_value(query))
}

#[must_use]
pub fn tel_href(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    format!("tel:{digits}")
}

#[must_use]
pub fn mailto_href(email: &str) -> String {
    format!("mailto:{}", email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.google.com/maps/search/?api=1&query=";

    #[test]
    fn encode_address_as_query_value() {
        assert_eq!(
            map_search_url(BASE, "Calle Mayor 1, 28013 Madrid"),
            "https://www.google.com/maps/search/?api=1&query=Calle%20Mayor%201%2C%2028013%20Madrid"
        );
        assert_eq!(encode_query_value("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query_value("Avda. (Norte) *!~'_-"), "Avda.%20(Norte)%20*!~'_-");
        assert_eq!(encode_query_value("Logroño"), "Logro%C3%B1o");
    }

    #[test]
    fn empty_query() {
        assert_eq!(map_search_url(BASE, ""), BASE);
    }

    #[test]
    fn contact_links() {
        assert_eq!(tel_href("+34 600 111 222"), "tel:+34600111222");
        assert_eq!(mailto_href(" info@example.com "), "mailto:info@example.com");
    }
}
