/// Three-state edit of an optional task field.
///
/// `Option<Option<T>>` reads badly at call sites; this spells out whether a
/// deadline (or any nullable field) is kept, replaced or removed.
///
/// ```
/// use chrono::NaiveDate;
/// use taskboard_domain::FieldUpdate;
///
/// let mut deadline = None;
/// FieldUpdate::Set(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).apply_to(&mut deadline);
/// assert!(deadline.is_some());
///
/// FieldUpdate::Clear.apply_to(&mut deadline);
/// assert_eq!(deadline, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    NoChange,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Clear, FieldUpdate::Set)
    }
}
