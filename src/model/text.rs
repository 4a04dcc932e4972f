#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub id: i64,
    pub content: String,
    /// Ids of the annotations attached to this text, ascending.
    pub annotations: Vec<i64>,
}
