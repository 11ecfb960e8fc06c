//! Extraction of token, seats and user id from a window fragment.

use scraper::{Html, Selector};

use crate::seats::Seat;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MarkupError {
    #[error("Anti-forgery token not found in fragment")]
    TokenNotFound,
}

/// Everything a submission needs, pulled from one window fragment.
#[derive(Debug, Clone)]
pub struct ReservationForm {
    pub token: String,
    pub seats: Vec<Seat>,
    /// Opaque portal user id, empty when the fragment does not embed one.
    pub user_id: String,
}

/// Parses a seat-selection fragment.
///
/// The fragment embeds an anti-forgery token as a hidden input; a missing
/// or empty token is fatal. Seats are `div.block` elements whose trimmed
/// text is the seat number; elements without a numeric label or an `id`
/// attribute are skipped. A `reserve` marker anywhere in the class
/// attribute means the seat is taken. The user id is the first UUID-shaped
/// value in embedded script text and is optional.
pub fn parse_reservation_form(fragment: &str) -> Result<ReservationForm, MarkupError> {
    let document = Html::parse_document(fragment);

    let token_selector = Selector::parse("input[name='__RequestVerificationToken']").unwrap();
    let token = document
        .select(&token_selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .unwrap_or_default()
        .to_string();
    if token.is_empty() {
        return Err(MarkupError::TokenNotFound);
    }

    let seat_selector = Selector::parse("div.block").unwrap();
    let mut seats = Vec::new();
    for element in document.select(&seat_selector) {
        let text = element.text().collect::<String>();
        let label = text.trim();
        let Some(element_id) = element.value().attr("id").filter(|id| !id.is_empty()) else {
            continue;
        };
        let Ok(number) = label.parse::<u32>() else {
            continue;
        };
        let classes = element.value().attr("class").unwrap_or_default();
        seats.push(Seat {
            number,
            element_id: element_id.to_string(),
            available: !classes.contains("reserve"),
        });
    }

    let script_selector = Selector::parse("script").unwrap();
    let scripts = document
        .select(&script_selector)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    let user_id = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .ok()
    .and_then(|re| re.find(&scripts))
    .map(|m| m.as_str().to_string())
    .unwrap_or_default();

    Ok(ReservationForm {
        token,
        seats,
        user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"
        <div>
            <input name="__RequestVerificationToken" type="hidden" value="tok-123" />
            <div class="seat-map">
                <div class="block" id="el-31">31</div>
                <div class="block reserveshode" id="el-32"> 32 </div>
                <div class="block" id="el-33">33</div>
                <div class="block" id="el-x">rahro</div>
                <div class="block">34</div>
            </div>
            <script>
                var currentUser = "a1b2c3d4-e5f6-7890-abcd-ef1234567890";
            </script>
        </div>
    "#;

    #[test]
    fn test_extracts_token_seats_and_user_id() {
        let form = parse_reservation_form(FRAGMENT).unwrap();
        assert_eq!(form.token, "tok-123");
        assert_eq!(form.user_id, "a1b2c3d4-e5f6-7890-abcd-ef1234567890");

        let numbers: Vec<u32> = form.seats.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![31, 32, 33]);
    }

    #[test]
    fn test_reserve_class_marks_seat_taken() {
        let form = parse_reservation_form(FRAGMENT).unwrap();
        let by_number = |n: u32| form.seats.iter().find(|s| s.number == n).unwrap();
        assert!(by_number(31).available);
        assert!(!by_number(32).available);
        assert_eq!(by_number(32).element_id, "el-32");
    }

    #[test]
    fn test_non_numeric_and_id_less_blocks_are_skipped() {
        let form = parse_reservation_form(FRAGMENT).unwrap();
        assert!(form.seats.iter().all(|s| s.number != 34));
        assert!(form.seats.iter().all(|s| !s.element_id.is_empty()));
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let fragment = r#"<div class="block" id="el-1">1</div>"#;
        assert!(matches!(
            parse_reservation_form(fragment),
            Err(MarkupError::TokenNotFound)
        ));
    }

    #[test]
    fn test_empty_token_is_fatal() {
        let fragment = r#"<input name="__RequestVerificationToken" value="" />"#;
        assert!(matches!(
            parse_reservation_form(fragment),
            Err(MarkupError::TokenNotFound)
        ));
    }

    #[test]
    fn test_missing_user_id_is_tolerated() {
        let fragment = r#"
            <input name="__RequestVerificationToken" value="tok" />
            <div class="block" id="el-5">5</div>
        "#;
        let form = parse_reservation_form(fragment).unwrap();
        assert_eq!(form.user_id, "");
        assert_eq!(form.seats.len(), 1);
    }
}
