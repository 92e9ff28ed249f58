//! Rule tables used by the token classifier and the segmenter.

pub mod amounts;
pub mod categories;
pub mod dates;
pub mod patterns;
pub mod phrases;
pub mod reference;

pub use amounts::{AmountRules, amount_shape, first_embedded_amount, parse_amount, split_trailing_amounts};
pub use categories::Categorizer;
pub use dates::{DayMonth, YearMap, month_number, parse_date_token, parse_long_date, split_date_prefix};
pub use phrases::{DirectionRules, PhraseSet};
pub use reference::ReferenceRules;
