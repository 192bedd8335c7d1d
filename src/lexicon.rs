//! Domain lexicon
//!
//! Two disjoint vocabularies: equipment names and problem/fault terms. The
//! lexicon is built once at startup and handed by reference to the segmenter
//! and the compound builder; it is never mutated afterwards.

use rustc_hash::FxHashSet;

use crate::errors::{Result, WordCloudError};

/// Curated equipment names.
pub const DEFAULT_EQUIPMENT: &[&str] = &[
    "空调", "电脑", "打印机", "照明灯", "插座", "开关", "网线", "门禁", "服务器", "软件", "设备",
    "实验室", "焊接车间", "天花板", "管路", "线缆", "减震器", "隔音墙", "咖啡机", "灯", "键盘",
    "鼠标", "网络",
];

/// Curated problem and fault descriptors.
pub const DEFAULT_PROBLEMS: &[&str] = &[
    "漏水", "漏电", "损坏", "打不开", "报错", "停止工作", "卡纸", "不亮", "无法开机", "失灵",
    "脱落", "断裂", "异响", "无法打印", "连接异常", "没反应", "坏", "烧", "停", "关", "开", "启",
    "拆", "整", "贴", "无反应",
];

/// Which vocabulary a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermClass {
    Equipment,
    Problem,
}

/// Immutable equipment + problem vocabulary.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Entries in declaration order, used for dictionary insertion
    equipment_order: Vec<String>,
    problem_order: Vec<String>,
    equipment: FxHashSet<String>,
    problems: FxHashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::maintenance()
    }
}

impl Lexicon {
    /// Build a lexicon from two word lists.
    ///
    /// Entries are trimmed, blanks and duplicates are ignored. Fails if a
    /// term appears in both lists, since the compound builder could not tell
    /// which half of a pair it is.
    pub fn new<E, P>(equipment: E, problems: P) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let (equipment_order, equipment) = Self::collect(equipment);
        let (problem_order, problems) = Self::collect(problems);

        let mut overlap: Vec<&str> = equipment_order
            .iter()
            .filter(|t| problems.contains(t.as_str()))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(WordCloudError::InvalidConfig(format!(
                "lexicon terms listed as both equipment and problem: {}",
                overlap.join(", ")
            )));
        }

        Ok(Self {
            equipment_order,
            problem_order,
            equipment,
            problems,
        })
    }

    /// The curated maintenance-ticket lexicon.
    pub fn maintenance() -> Self {
        let (equipment_order, equipment) = Self::collect(DEFAULT_EQUIPMENT);
        let (problem_order, problems) = Self::collect(DEFAULT_PROBLEMS);
        Self {
            equipment_order,
            problem_order,
            equipment,
            problems,
        }
    }

    fn collect<I>(words: I) -> (Vec<String>, FxHashSet<String>)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut order = Vec::new();
        let mut set = FxHashSet::default();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() || set.contains(word) {
                continue;
            }
            set.insert(word.to_string());
            order.push(word.to_string());
        }
        (order, set)
    }

    pub fn is_equipment(&self, term: &str) -> bool {
        self.equipment.contains(term)
    }

    pub fn is_problem(&self, term: &str) -> bool {
        self.problems.contains(term)
    }

    /// True if the term belongs to either vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.is_equipment(term) || self.is_problem(term)
    }

    pub fn classify(&self, term: &str) -> Option<TermClass> {
        if self.is_equipment(term) {
            Some(TermClass::Equipment)
        } else if self.is_problem(term) {
            Some(TermClass::Problem)
        } else {
            None
        }
    }

    /// All entries with their class, equipment first, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, TermClass)> {
        self.equipment_order
            .iter()
            .map(|t| (t.as_str(), TermClass::Equipment))
            .chain(
                self.problem_order
                    .iter()
                    .map(|t| (t.as_str(), TermClass::Problem)),
            )
    }

    pub fn len(&self) -> usize {
        self.equipment.len() + self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
