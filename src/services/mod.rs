pub(crate) mod answer_key;
pub(crate) mod documents;
pub(crate) mod exam_sessions;
pub(crate) mod grading;
pub(crate) mod session_timing;
