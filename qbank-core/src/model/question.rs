//! Questions: shared fields plus a closed set of typed variants

use super::answer::{
    Answer, CalculatedAnswer, ClozeItem, DragItem, DropZone, Hint, NumericalAnswer, SelectOption,
    Subquestion, Unit,
};
use super::category::CategoryId;
use super::dataset::Dataset;
use super::numeric::format_number;
use crate::enums::{Grading, Numbering, ResponseFormat, ShowAnswer, ShowUnits, ShuffleType, TextFormat};
use crate::error::ModelError;
use crate::files::FileRef;
use crate::text::expr::Expr;
use crate::text::ftext::{FText, Segment};
use crate::text::markup::Delimiters;
use crate::text::substitute::{substitute, Bindings, VarValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_QUESTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a question. Clones share it; deserialized
/// questions get a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(u64);

impl QuestionId {
    pub fn next() -> Self {
        QuestionId(NEXT_QUESTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::next()
    }
}

/// Answer list shared by the variants that have one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options<T> {
    pub items: Vec<T>,
    /// 0 means unlimited.
    #[serde(default)]
    pub max_tries: u32,
    #[serde(default)]
    pub shuffle: ShuffleType,
    #[serde(default)]
    pub show_answer: ShowAnswer,
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub hints: Vec<Hint>,
}

impl<T> Default for Options<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            max_tries: 0,
            shuffle: ShuffleType::default(),
            show_answer: ShowAnswer::default(),
            ordered: false,
            hints: Vec::new(),
        }
    }
}

impl<T> Options<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn check(&self) -> Result<(), ModelError> {
        if self.max_tries > 0 && self.hints.len() > self.max_tries as usize {
            return Err(ModelError::TooManyHints {
                hints: self.hints.len(),
                max_tries: self.max_tries,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Units {
    #[serde(default)]
    pub grading_type: Grading,
    #[serde(default)]
    pub unit_penalty: f64,
    #[serde(default)]
    pub show_unit: ShowUnits,
    /// Unit written before the number.
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Essay {
    pub response_format: ResponseFormat,
    pub response_required: bool,
    pub lines: u32,
    pub attachments: u32,
    pub attachments_required: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub template: FText,
    #[serde(default)]
    pub grader_info: FText,
}

impl Default for Essay {
    fn default() -> Self {
        Self {
            response_format: ResponseFormat::default(),
            response_required: true,
            lines: 15,
            attachments: 0,
            attachments_required: 0,
            max_bytes: None,
            file_types: Vec::new(),
            template: FText::default(),
            grader_info: FText::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueFalse {
    pub true_ans: Answer,
    pub false_ans: Answer,
}

impl Default for TrueFalse {
    fn default() -> Self {
        Self {
            true_ans: Answer::new(100.0, "true"),
            false_ans: Answer::new(0.0, "false"),
        }
    }
}

impl TrueFalse {
    pub fn set_correct(&mut self, correct: bool) {
        let (right, wrong) = if correct { (100.0, 0.0) } else { (0.0, 100.0) };
        self.true_ans.fraction = right;
        self.false_ans.fraction = wrong;
    }

    pub fn correct(&self) -> bool {
        self.true_ans.fraction == 100.0
    }

    fn check(&self) -> Result<(), ModelError> {
        if (self.true_ans.fraction == 100.0) == (self.false_ans.fraction == 100.0) {
            return Err(ModelError::TrueFalseFractions {
                true_fraction: self.true_ans.fraction,
                false_fraction: self.false_ans.fraction,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Numerical {
    pub options: Options<NumericalAnswer>,
    #[serde(default)]
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Calculated {
    pub options: Options<CalculatedAnswer>,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub synchronize: bool,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl Calculated {
    fn wildcards(&self, index: u32) -> Wildcards<'_> {
        Wildcards {
            datasets: &self.datasets,
            index,
        }
    }

    /// The body with every `{x}`, `{=formula}` and `[x]` replaced by its value for
    /// dataset item `index`.
    pub fn instance(&self, body: &FText, index: u32) -> Result<String, ModelError> {
        self.wildcards(index).render(body)
    }

    /// Value of each answer formula for dataset item `index`.
    pub fn answers_at(&self, index: u32) -> Result<Vec<f64>, ModelError> {
        self.wildcards(index).values(&self.options.items)
    }
}

/// Dataset values of one item, as seen by formulas and `[name]` templates.
struct Wildcards<'a> {
    datasets: &'a [Dataset],
    index: u32,
}

impl Wildcards<'_> {
    fn value(&self, name: &str) -> Option<f64> {
        self.datasets
            .iter()
            .find(|dataset| dataset.name == name)
            .and_then(|dataset| dataset.value(self.index))
    }

    fn bindings(&self) -> Bindings {
        self.datasets
            .iter()
            .filter_map(|dataset| {
                let value = dataset.value(self.index)?;
                Some((dataset.name.clone(), VarValue::Number(value)))
            })
            .collect()
    }

    fn evaluate(&self, formula: &str) -> Result<f64, ModelError> {
        Expr::parse(formula)
            .ok()
            .and_then(|expr| expr.eval(&|name: &str| self.value(name)))
            .ok_or_else(|| ModelError::Formula(formula.to_string()))
    }

    fn render(&self, text: &FText) -> Result<String, ModelError> {
        let bindings = self.bindings();
        let mut out = String::new();
        for segment in &text.segments {
            match segment {
                Segment::Text(text) => out.push_str(&substitute(text, &bindings)?),
                Segment::Variable(name) => {
                    let value = self
                        .value(name)
                        .ok_or_else(|| ModelError::MissingDatasetItem(name.clone(), self.index))?;
                    out.push_str(&format_number(value));
                }
                Segment::Formula(formula) => out.push_str(&format_number(self.evaluate(formula)?)),
                Segment::File(file) => out.push_str(&file.path),
                other => out.push_str(&other.to_string()),
            }
        }
        Ok(out)
    }

    fn values(&self, answers: &[CalculatedAnswer]) -> Result<Vec<f64>, ModelError> {
        answers
            .iter()
            .map(|answer| self.evaluate(&answer.numeric.answer.text))
            .collect()
    }

    fn answers(&self, answers: &[CalculatedAnswer]) -> Result<Vec<InstanceAnswer>, ModelError> {
        answers
            .iter()
            .map(|answer| {
                let answer = &answer.numeric.answer;
                Ok(InstanceAnswer {
                    fraction: answer.fraction,
                    value: self.evaluate(&answer.text)?,
                    feedback: answer.feedback.as_ref().map(|text| self.render(text)).transpose()?,
                })
            })
            .collect()
    }
}

/// One generated variant of a calculated question.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedInstance {
    /// Dataset item the values were taken from.
    pub index: u32,
    pub body: String,
    pub remarks: String,
    pub feedbacks: Vec<String>,
    /// Option hints followed by free hints.
    pub hints: Vec<String>,
    pub answers: Vec<InstanceAnswer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceAnswer {
    pub fraction: f64,
    pub value: f64,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMultichoice {
    pub options: Options<CalculatedAnswer>,
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub synchronize: bool,
    pub single: bool,
    #[serde(default)]
    pub numbering: Numbering,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl CalculatedMultichoice {
    fn wildcards(&self, index: u32) -> Wildcards<'_> {
        Wildcards {
            datasets: &self.datasets,
            index,
        }
    }

    pub fn instance(&self, body: &FText, index: u32) -> Result<String, ModelError> {
        self.wildcards(index).render(body)
    }

    pub fn answers_at(&self, index: u32) -> Result<Vec<f64>, ModelError> {
        self.wildcards(index).values(&self.options.items)
    }
}

impl Default for CalculatedMultichoice {
    fn default() -> Self {
        Self {
            options: Options::default(),
            units: Units::default(),
            synchronize: false,
            single: true,
            numbering: Numbering::default(),
            datasets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multichoice {
    pub options: Options<Answer>,
    pub single: bool,
    #[serde(default)]
    pub numbering: Numbering,
    #[serde(default)]
    pub show_instruction: bool,
}

impl Default for Multichoice {
    fn default() -> Self {
        Self {
            options: Options::default(),
            single: true,
            numbering: Numbering::default(),
            show_instruction: false,
        }
    }
}

impl Multichoice {
    /// Index of the first full-credit choice.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.items.iter().position(Answer::is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortAnswer {
    pub options: Options<Answer>,
    #[serde(default)]
    pub use_case: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matching {
    pub options: Options<Subquestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomMatching {
    pub choose: u32,
    pub subcats: bool,
}

impl Default for RandomMatching {
    fn default() -> Self {
        Self {
            choose: 2,
            subcats: true,
        }
    }
}

/// One piece of a gap-select body.
#[derive(Debug, Clone, PartialEq)]
pub enum GapItem<'a> {
    Text(String),
    Gap(&'a SelectOption),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MissingWord {
    pub options: Options<SelectOption>,
}

impl MissingWord {
    /// Body split at its `[[N]]` markers, each marker resolved to option `N`.
    /// Markers without a matching option stay in the text.
    pub fn get_items<'a>(&'a self, body: &FText) -> Vec<GapItem<'a>> {
        let mut items = Vec::new();
        let mut text = String::new();
        for segment in &body.segments {
            let option = match segment {
                Segment::Blank(n) => n.checked_sub(1).and_then(|idx| self.options.items.get(idx)),
                _ => None,
            };
            match option {
                Some(option) => {
                    if !text.is_empty() {
                        items.push(GapItem::Text(std::mem::take(&mut text)));
                    }
                    items.push(GapItem::Gap(option));
                }
                None => text.push_str(&segment.to_string()),
            }
        }
        if !text.is_empty() {
            items.push(GapItem::Text(text));
        }
        items
    }

    /// The body with each gap filled by its option text.
    pub fn pure_text(&self, body: &FText) -> String {
        self.get_items(body)
            .into_iter()
            .map(|item| match item {
                GapItem::Text(text) => text,
                GapItem::Gap(option) => option.text.clone(),
            })
            .collect()
    }

    fn check(&self, body: &FText) -> Result<(), ModelError> {
        let markers = body.blanks().len();
        if markers != self.options.items.len() {
            return Err(ModelError::MarkerMismatch {
                markers,
                options: self.options.items.len(),
            });
        }
        Ok(())
    }
}

/// Cloze question: the body carries one `Cloze(i)` marker per option group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Embedded {
    pub options: Options<ClozeItem>,
}

impl Embedded {
    /// The body in cloze syntax with every group spliced back at its marker.
    pub fn pure_text(&self, body: &FText) -> String {
        body.to_source_with(TextFormat::Plain, &Delimiters::cloze(), |segment| match segment {
            Segment::Cloze(idx) => self.options.items.get(*idx).map(ClozeItem::to_cloze),
            _ => None,
        })
    }

    fn check(&self, body: &FText) -> Result<(), ModelError> {
        let markers = body.cloze_markers();
        if markers != self.options.items.len() {
            return Err(ModelError::MarkerMismatch {
                markers,
                options: self.options.items.len(),
            });
        }
        for (group, item) in self.options.items.iter().enumerate() {
            if !item.has_correct_choice() {
                return Err(ModelError::NoCorrectChoice { group });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DragAndDropText {
    pub options: Options<DragItem>,
}

impl DragAndDropText {
    /// The body with each `[[N]]` replaced by drag item `N`.
    pub fn pure_text(&self, body: &FText) -> String {
        body.segments
            .iter()
            .map(|segment| match segment {
                Segment::Blank(n) => n
                    .checked_sub(1)
                    .and_then(|idx| self.options.items.get(idx))
                    .map(|item| item.text.clone())
                    .unwrap_or_else(|| segment.to_string()),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DragAndDropImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<FileRef>,
    pub options: Options<DragItem>,
    #[serde(default)]
    pub zones: Vec<DropZone>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DragAndDropMarker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<FileRef>,
    pub options: Options<DragItem>,
    #[serde(default)]
    pub zones: Vec<DropZone>,
    #[serde(default)]
    pub highlight_empty: bool,
}

/// A question made of independent sub-questions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Problem {
    pub subquestions: Vec<Question>,
}

/// Variant tag, also the static registration table of question types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    Description,
    Essay,
    TrueFalse,
    Numerical,
    Calculated,
    CalculatedMultichoice,
    Multichoice,
    ShortAnswer,
    Matching,
    RandomMatching,
    MissingWord,
    Embedded,
    DragAndDropText,
    DragAndDropImage,
    DragAndDropMarker,
    Problem,
}

impl QuestionType {
    pub const ALL: [QuestionType; 16] = [
        QuestionType::Description,
        QuestionType::Essay,
        QuestionType::TrueFalse,
        QuestionType::Numerical,
        QuestionType::Calculated,
        QuestionType::CalculatedMultichoice,
        QuestionType::Multichoice,
        QuestionType::ShortAnswer,
        QuestionType::Matching,
        QuestionType::RandomMatching,
        QuestionType::MissingWord,
        QuestionType::Embedded,
        QuestionType::DragAndDropText,
        QuestionType::DragAndDropImage,
        QuestionType::DragAndDropMarker,
        QuestionType::Problem,
    ];

    /// Moodle question type tag.
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::Description => "description",
            QuestionType::Essay => "essay",
            QuestionType::TrueFalse => "truefalse",
            QuestionType::Numerical => "numerical",
            QuestionType::Calculated => "calculated",
            QuestionType::CalculatedMultichoice => "calculatedmulti",
            QuestionType::Multichoice => "multichoice",
            QuestionType::ShortAnswer => "shortanswer",
            QuestionType::Matching => "match",
            QuestionType::RandomMatching => "randomsamatch",
            QuestionType::MissingWord => "gapselect",
            QuestionType::Embedded => "cloze",
            QuestionType::DragAndDropText => "ddwtos",
            QuestionType::DragAndDropImage => "ddimageortext",
            QuestionType::DragAndDropMarker => "ddmarker",
            QuestionType::Problem => "problem",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestionKind {
    Description,
    Essay(Essay),
    TrueFalse(TrueFalse),
    Numerical(Numerical),
    Calculated(Calculated),
    CalculatedMultichoice(CalculatedMultichoice),
    Multichoice(Multichoice),
    ShortAnswer(ShortAnswer),
    Matching(Matching),
    RandomMatching(RandomMatching),
    MissingWord(MissingWord),
    Embedded(Embedded),
    DragAndDropText(DragAndDropText),
    DragAndDropImage(DragAndDropImage),
    DragAndDropMarker(DragAndDropMarker),
    Problem(Problem),
}

impl QuestionKind {
    /// Empty variant of type `ty`.
    pub fn new(ty: QuestionType) -> Self {
        match ty {
            QuestionType::Description => QuestionKind::Description,
            QuestionType::Essay => QuestionKind::Essay(Essay::default()),
            QuestionType::TrueFalse => QuestionKind::TrueFalse(TrueFalse::default()),
            QuestionType::Numerical => QuestionKind::Numerical(Numerical::default()),
            QuestionType::Calculated => QuestionKind::Calculated(Calculated::default()),
            QuestionType::CalculatedMultichoice => {
                QuestionKind::CalculatedMultichoice(CalculatedMultichoice::default())
            }
            QuestionType::Multichoice => QuestionKind::Multichoice(Multichoice::default()),
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer(ShortAnswer::default()),
            QuestionType::Matching => QuestionKind::Matching(Matching::default()),
            QuestionType::RandomMatching => QuestionKind::RandomMatching(RandomMatching::default()),
            QuestionType::MissingWord => QuestionKind::MissingWord(MissingWord::default()),
            QuestionType::Embedded => QuestionKind::Embedded(Embedded::default()),
            QuestionType::DragAndDropText => QuestionKind::DragAndDropText(DragAndDropText::default()),
            QuestionType::DragAndDropImage => QuestionKind::DragAndDropImage(DragAndDropImage::default()),
            QuestionType::DragAndDropMarker => {
                QuestionKind::DragAndDropMarker(DragAndDropMarker::default())
            }
            QuestionType::Problem => QuestionKind::Problem(Problem::default()),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Description => QuestionType::Description,
            QuestionKind::Essay(_) => QuestionType::Essay,
            QuestionKind::TrueFalse(_) => QuestionType::TrueFalse,
            QuestionKind::Numerical(_) => QuestionType::Numerical,
            QuestionKind::Calculated(_) => QuestionType::Calculated,
            QuestionKind::CalculatedMultichoice(_) => QuestionType::CalculatedMultichoice,
            QuestionKind::Multichoice(_) => QuestionType::Multichoice,
            QuestionKind::ShortAnswer(_) => QuestionType::ShortAnswer,
            QuestionKind::Matching(_) => QuestionType::Matching,
            QuestionKind::RandomMatching(_) => QuestionType::RandomMatching,
            QuestionKind::MissingWord(_) => QuestionType::MissingWord,
            QuestionKind::Embedded(_) => QuestionType::Embedded,
            QuestionKind::DragAndDropText(_) => QuestionType::DragAndDropText,
            QuestionKind::DragAndDropImage(_) => QuestionType::DragAndDropImage,
            QuestionKind::DragAndDropMarker(_) => QuestionType::DragAndDropMarker,
            QuestionKind::Problem(_) => QuestionType::Problem,
        }
    }

    /// Delimiters live in the body of a question of this kind.
    pub fn body_delimiters(&self) -> Delimiters {
        match self {
            QuestionKind::Embedded(_) => Delimiters::cloze(),
            QuestionKind::Calculated(_) | QuestionKind::CalculatedMultichoice(_) => Delimiters::calculated(),
            QuestionKind::MissingWord(_) | QuestionKind::DragAndDropText(_) => Delimiters::gaps(),
            _ => Delimiters::rich(),
        }
    }

    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        match self {
            QuestionKind::Description | QuestionKind::RandomMatching(_) => {}
            QuestionKind::Essay(q) => {
                texts.push(&mut q.template);
                texts.push(&mut q.grader_info);
            }
            QuestionKind::TrueFalse(q) => {
                q.true_ans.collect(texts, files);
                q.false_ans.collect(texts, files);
            }
            QuestionKind::Numerical(q) => q.options.collect(texts, files),
            QuestionKind::Calculated(q) => q.options.collect(texts, files),
            QuestionKind::CalculatedMultichoice(q) => q.options.collect(texts, files),
            QuestionKind::Multichoice(q) => q.options.collect(texts, files),
            QuestionKind::ShortAnswer(q) => q.options.collect(texts, files),
            QuestionKind::Matching(q) => q.options.collect(texts, files),
            QuestionKind::MissingWord(q) => q.options.collect(texts, files),
            QuestionKind::Embedded(q) => q.options.collect(texts, files),
            QuestionKind::DragAndDropText(q) => q.options.collect(texts, files),
            QuestionKind::DragAndDropImage(q) => {
                files.extend(q.background.as_mut());
                q.options.collect(texts, files);
            }
            QuestionKind::DragAndDropMarker(q) => {
                files.extend(q.background.as_mut());
                q.options.collect(texts, files);
            }
            QuestionKind::Problem(problem) => {
                for sub in &mut problem.subquestions {
                    sub.collect(texts, files);
                }
            }
        }
    }
}

/// Rich text and files owned by one entry of an answer list.
trait ItemTexts {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>);
}

impl ItemTexts for Answer {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, _files: &mut Vec<&'a mut FileRef>) {
        texts.extend(self.feedback.as_mut());
    }
}

impl ItemTexts for NumericalAnswer {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        self.answer.collect(texts, files);
    }
}

impl ItemTexts for CalculatedAnswer {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        self.numeric.answer.collect(texts, files);
    }
}

impl ItemTexts for ClozeItem {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        for opt in &mut self.opts {
            opt.collect(texts, files);
        }
    }
}

impl ItemTexts for Subquestion {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, _files: &mut Vec<&'a mut FileRef>) {
        texts.push(&mut self.text);
    }
}

impl ItemTexts for SelectOption {
    fn collect<'a>(&'a mut self, _texts: &mut Vec<&'a mut FText>, _files: &mut Vec<&'a mut FileRef>) {}
}

impl ItemTexts for DragItem {
    fn collect<'a>(&'a mut self, _texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        files.extend(self.image.as_mut());
    }
}

impl<T: ItemTexts> Options<T> {
    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        for item in &mut self.items {
            item.collect(texts, files);
        }
        texts.extend(self.hints.iter_mut().map(|hint| &mut hint.text));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub fraction: f64,
    pub text: FText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(skip)]
    pub(crate) id: QuestionId,
    pub name: String,
    #[serde(default = "default_grade")]
    pub default_grade: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbid: Option<u32>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub body: FText,
    /// General feedback.
    #[serde(default)]
    pub remarks: FText,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
    #[serde(default)]
    pub free_hints: Vec<FText>,
    /// Seconds; 0 means no limit.
    #[serde(default)]
    pub time_lim: u32,
    #[serde(skip)]
    pub(crate) parent: Option<CategoryId>,
    pub kind: QuestionKind,
}

fn default_grade() -> f64 {
    1.0
}

/// Structural equality; identity and parent are ignored.
impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.default_grade == other.default_grade
            && self.dbid == other.dbid
            && self.tags == other.tags
            && self.body == other.body
            && self.remarks == other.remarks
            && self.feedbacks == other.feedbacks
            && self.free_hints == other.free_hints
            && self.time_lim == other.time_lim
            && self.kind == other.kind
    }
}

impl Question {
    pub fn new(name: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: QuestionId::next(),
            name: name.into(),
            default_grade: default_grade(),
            dbid: None,
            tags: BTreeSet::new(),
            body: FText::default(),
            remarks: FText::default(),
            feedbacks: Vec::new(),
            free_hints: Vec::new(),
            time_lim: 0,
            parent: None,
            kind,
        }
    }

    pub fn with_body(mut self, body: FText) -> Self {
        self.body = body;
        self
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// A copy with a fresh identity and no parent.
    pub fn duplicate(&self) -> Self {
        Self {
            id: QuestionId::next(),
            parent: None,
            ..self.clone()
        }
    }

    /// Every rich-text field: the shared ones, answer feedback, hints, the
    /// variant's own texts and those of problem sub-questions.
    pub fn texts_mut(&mut self) -> Vec<&mut FText> {
        let mut texts = Vec::new();
        self.collect(&mut texts, &mut Vec::new());
        texts
    }

    /// Every file reference: those inline in [`Question::texts_mut`] followed by
    /// drag item images and drop backgrounds.
    pub fn files_mut(&mut self) -> Vec<&mut FileRef> {
        let mut texts = Vec::new();
        let mut files = Vec::new();
        self.collect(&mut texts, &mut files);
        let mut refs: Vec<&mut FileRef> = texts.into_iter().flat_map(FText::files_mut).collect();
        refs.append(&mut files);
        refs
    }

    fn collect<'a>(&'a mut self, texts: &mut Vec<&'a mut FText>, files: &mut Vec<&'a mut FileRef>) {
        texts.push(&mut self.body);
        texts.push(&mut self.remarks);
        texts.extend(self.feedbacks.iter_mut().map(|feedback| &mut feedback.text));
        texts.extend(self.free_hints.iter_mut());
        self.kind.collect(texts, files);
    }

    /// Generated variant `index` of a calculated question: every text with its
    /// variables replaced by that dataset item. `None` for other kinds.
    pub fn instance(&self, index: u32) -> Option<Result<CalculatedInstance, ModelError>> {
        let (wildcards, options) = match &self.kind {
            QuestionKind::Calculated(q) => (q.wildcards(index), &q.options),
            QuestionKind::CalculatedMultichoice(q) => (q.wildcards(index), &q.options),
            _ => return None,
        };
        Some(self.instantiate(&wildcards, options))
    }

    fn instantiate(
        &self,
        wildcards: &Wildcards<'_>,
        options: &Options<CalculatedAnswer>,
    ) -> Result<CalculatedInstance, ModelError> {
        let hints = options
            .hints
            .iter()
            .map(|hint| &hint.text)
            .chain(self.free_hints.iter())
            .map(|text| wildcards.render(text))
            .collect::<Result<_, _>>()?;
        Ok(CalculatedInstance {
            index: wildcards.index,
            body: wildcards.render(&self.body)?,
            remarks: wildcards.render(&self.remarks)?,
            feedbacks: self
                .feedbacks
                .iter()
                .map(|feedback| wildcards.render(&feedback.text))
                .collect::<Result<_, _>>()?,
            hints,
            answers: wildcards.answers(&options.items)?,
        })
    }

    pub fn check(&self) -> Result<(), ModelError> {
        match &self.kind {
            QuestionKind::Description | QuestionKind::Essay(_) | QuestionKind::RandomMatching(_) => Ok(()),
            QuestionKind::TrueFalse(tf) => tf.check(),
            QuestionKind::Numerical(q) => q.options.check(),
            QuestionKind::Calculated(q) => q.options.check(),
            QuestionKind::CalculatedMultichoice(q) => q.options.check(),
            QuestionKind::Multichoice(q) => q.options.check(),
            QuestionKind::ShortAnswer(q) => q.options.check(),
            QuestionKind::Matching(q) => q.options.check(),
            QuestionKind::MissingWord(q) => {
                q.options.check()?;
                q.check(&self.body)
            }
            QuestionKind::Embedded(q) => {
                q.options.check()?;
                q.check(&self.body)
            }
            QuestionKind::DragAndDropText(q) => check_drags(&q.options),
            QuestionKind::DragAndDropImage(q) => check_drags(&q.options),
            QuestionKind::DragAndDropMarker(q) => check_drags(&q.options),
            QuestionKind::Problem(problem) => {
                for (index, sub) in problem.subquestions.iter().enumerate() {
                    sub.check().map_err(|source| ModelError::Sub {
                        index,
                        source: Box::new(source),
                    })?;
                }
                Ok(())
            }
        }
    }
}

fn check_drags(options: &Options<DragItem>) -> Result<(), ModelError> {
    options.check()?;
    options.items.iter().try_for_each(DragItem::check)
}
