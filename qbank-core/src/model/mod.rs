//! Question bank data model

pub mod answer;
pub mod category;
pub mod dataset;
pub mod numeric;
pub mod question;

pub use answer::{
    Answer, CalculatedAnswer, ClozeItem, DragItem, DropZone, Hint, NumericalAnswer, SelectOption,
    Subquestion, Unit,
};
pub use category::{Category, CategoryId, Query};
pub use dataset::Dataset;
pub use question::{
    Calculated, CalculatedInstance, CalculatedMultichoice, DragAndDropImage, DragAndDropMarker,
    DragAndDropText, Embedded, Essay, Feedback, GapItem, InstanceAnswer, Matching, MissingWord,
    Multichoice, Numerical, Options, Problem, Question, QuestionId, QuestionKind, QuestionType,
    RandomMatching, ShortAnswer, TrueFalse, Units,
};
