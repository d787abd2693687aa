//! Stopword vocabulary and filtering.
//!
//! The built-in vocabulary mixes English function words, common Chinese
//! function words and low-information nouns, punctuation (ASCII and CJK),
//! digits, and CJK numerals. It is populated on first use.
//!
//! A replacement vocabulary can be loaded from a newline-separated file with
//! [`Stopwords::load_or_builtin`]. Loading never fails from the caller's point
//! of view: any problem is logged and the built-in vocabulary is used.

use std::collections::HashSet;
use std::sync::LazyLock;

use camino::Utf8Path;

/// The built-in stopword vocabulary.
pub static BUILTIN_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // English
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
        "did", "will", "would", "should", "could", "may", "might", "must", "can", "this", "that",
        "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
        "them", "my", "your", "his", "its", "our", "their", "what", "which", "who", "whom",
        "whose", "where", "when", "why", "how", "all", "each", "every", "both", "few", "more",
        "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
        "too", "very", "just", "now",
        // Chinese function words
        "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也",
        "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那", "他",
        "她", "它", "们", "这个", "那个", "这些", "那些", "这样", "那样", "这里", "那里", "什么",
        "怎么", "为什么", "如何", "哪里", "哪个", "哪些", "多少", "何时", "因为", "所以", "但是",
        "然而", "而且", "或者", "如果", "虽然", "尽管", "即使", "无论", "可以", "能够", "应该",
        "必须", "需要", "想要", "希望", "觉得", "认为", "知道", "了解", "进行", "开始", "结束",
        "完成", "实现", "得到", "获得", "使用", "利用", "通过", "根据", "关于", "对于", "由于",
        "按照", "依照", "经过", "随着", "一些", "一切", "一般", "一起", "一直", "一定", "一样",
        "一次", "一面", "不是", "不会", "不能", "不要", "不过", "不但", "不仅", "不管", "不论",
        "还是", "还有", "还要", "已经", "正在", "将要", "曾经", "现在", "过去", "将来", "今天",
        "明天", "昨天", "可能", "也许", "大概", "似乎", "好像", "仿佛", "非常", "更", "最", "比较",
        "相当", "十分", "特别", "尤其", "首先", "其次", "然后", "最后", "接着", "同时", "另外",
        "此外", "为了", "以便", "以免", "因此", "于是", "可是", "只是", "假如", "倘若", "要是",
        "只要", "只有", "除非", "纵然", "哪怕", "或是", "要么", "以及", "与", "同", "跟", "及",
        "从", "向", "往", "朝", "于", "由", "自", "对", "至于", "被", "让", "使", "把", "将", "地",
        "得", "过", "呢", "吗", "吧", "啊", "呀", "啦",
        // Punctuation
        "?", "!", ".", ",", ";", ":", "\"", "'", "(", ")", "[", "]", "{", "}", "--", "——", "…",
        "、", "。", "，", "；", "：", "？", "！",
        // Digits and numerals
        "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "二", "三", "四", "五", "六", "七", "八",
        "九", "十", "百", "千", "万",
        // Low-information nouns and qualifiers
        "等", "等等", "之类", "的话", "来说", "而言", "时候", "时间", "地方", "方面", "问题", "情况",
        "事情", "方法", "方式", "办法", "手段", "途径", "结果", "效果", "影响", "作用", "意义",
        "价值", "原因", "理由", "依据", "基础", "过程", "阶段", "步骤", "环节", "部分", "内容",
        "形式", "类型", "种类", "类别", "程度", "范围", "领域", "角度", "关系", "联系", "区别",
        "差异", "相同", "不同", "特点", "特征", "性质", "属性", "本质", "发展", "变化", "改变",
        "改善", "提高", "增加", "减少", "重要", "主要", "关键", "核心", "中心", "重点", "基本",
        "根本", "前提", "条件", "必要", "要求", "应当", "肯定", "确定", "明确", "清楚", "很多",
        "许多", "大量", "多数", "大多数", "全部", "所有", "一点", "几个", "少数", "个别",
    ]
    .into_iter()
    .collect()
});

/// A stopword vocabulary: either the built-in set or a loaded replacement.
#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    custom: Option<HashSet<String>>,
}

impl Stopwords {
    /// The built-in vocabulary.
    pub const fn builtin() -> Self {
        Self { custom: None }
    }

    /// Build a vocabulary from an explicit word list, replacing the built-in set.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            custom: Some(words.into_iter().map(Into::into).collect()),
        }
    }

    /// Load a vocabulary file, falling back to the built-in set on any failure.
    ///
    /// One word per line; surrounding whitespace is trimmed, blank lines and
    /// lines starting with `#` are skipped. A file that yields no words is
    /// treated as a failure.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub fn load_or_builtin(path: &Utf8Path) -> Self {
        match std::fs::read_to_string(path.as_std_path()) {
            Ok(text) => {
                let words: HashSet<String> = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string)
                    .collect();
                if words.is_empty() {
                    tracing::warn!("stopword file is empty, using built-in stopwords");
                    return Self::builtin();
                }
                tracing::debug!(count = words.len(), "loaded stopword file");
                Self {
                    custom: Some(words),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load stopword file, using built-in stopwords");
                Self::builtin()
            }
        }
    }

    /// Whether this vocabulary came from a file or explicit list.
    pub const fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Number of entries in the vocabulary.
    pub fn len(&self) -> usize {
        self.custom
            .as_ref()
            .map_or_else(|| BUILTIN_STOPWORDS.len(), HashSet::len)
    }

    /// Whether the vocabulary has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, word: &str) -> bool {
        match &self.custom {
            Some(set) => set.contains(word),
            None => BUILTIN_STOPWORDS.contains(word),
        }
    }

    /// Returns `true` if `word` is blank or in the vocabulary.
    ///
    /// Both the lowercased and the original-case trimmed forms are checked.
    pub fn is_stopword(&self, word: &str) -> bool {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return true;
        }
        self.contains(&trimmed.to_lowercase()) || self.contains(trimmed)
    }

    /// Remove stopwords, preserving order.
    pub fn filter<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        words
            .iter()
            .filter(|w| !self.is_stopword(w.as_ref()))
            .map(|w| w.as_ref().to_string())
            .collect()
    }
}

/// Check a word against the built-in vocabulary.
pub fn is_stopword(word: &str) -> bool {
    Stopwords::builtin().is_stopword(word)
}

/// Remove built-in stopwords from `words`, preserving order.
pub fn filter_stopwords<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    Stopwords::builtin().filter(words)
}
