//! Closed-vocabulary lookup of calculus concepts.
//!
//! `describe_concept` scores the query against a small keyword bag per concept with a
//! term-frequency cosine; `answer_calculus_question` is the cruder keyword scan used for
//! free-form questions.
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// scores below this fall back to the generic answer
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

pub static CALCULUS_CONCEPTS: [(&str, &str); 7] = [
    (
        "derivative",
        "The derivative measures the rate of change of a function with respect to a variable. Geometrically, it represents the slope of the tangent line to the function at a point.",
    ),
    (
        "integral",
        "The integral represents the accumulation of quantities. Geometrically, the definite integral is the signed area between the function and the x-axis over a given interval.",
    ),
    (
        "limit",
        "A limit describes the value a function approaches as the input approaches a particular value. Limits are fundamental to calculus concepts of continuity, derivatives, and integrals.",
    ),
    (
        "continuity",
        "A function is continuous at a point if there is no abrupt change (jump) at that point. Formally, a function is continuous at a point if the limit equals the function value at that point.",
    ),
    (
        "extrema",
        "Extrema are the maximum and minimum values of a function. They can be found by determining where the derivative equals zero (critical points) and analyzing the second derivative.",
    ),
    (
        "inflection",
        "An inflection point is where the curvature of a function changes sign. It occurs when the second derivative equals zero and changes sign around that point.",
    ),
    (
        "series",
        "A series is the sum of the terms of a sequence. Power series represent functions as infinite sums of powers of the variable, useful for approximating functions.",
    ),
];

/// Keyword bag per concept, the concept name first.
pub static CONCEPT_KEYWORDS: [(&str, &[&str]); 7] = [
    ("derivative", &["derivative", "differentiation", "rate", "change", "slope"]),
    ("integral", &["integral", "integration", "area", "antiderivative"]),
    ("limit", &["limit", "approaching", "tends"]),
    ("continuity", &["continuity", "continuous", "discontinuity"]),
    ("extrema", &["extrema", "maximum", "minimum", "extreme", "peak", "valley"]),
    ("inflection", &["inflection", "concavity", "curvature"]),
    ("series", &["series", "taylor", "maclaurin", "power"]),
];

/// Phrases scanned as substrings by `answer_calculus_question`, first match wins.
pub static QUESTION_KEYWORDS: [(&str, &[&str]); 7] = [
    ("derivative", &["derivative", "differentiation", "rate of change", "slope"]),
    ("integral", &["integral", "integration", "area", "antiderivative"]),
    ("limit", &["limit", "approaching", "tends to"]),
    ("continuity", &["continuous", "continuity", "discontinuity"]),
    ("extrema", &["maximum", "minimum", "extrema", "extreme", "peak", "valley"]),
    ("inflection", &["inflection", "concavity", "curvature"]),
    ("series", &["series", "taylor", "maclaurin", "power series"]),
];

pub const CONCEPT_FALLBACK: &str = "This is a concept in calculus. For more specific information, please ask about derivatives, integrals, limits, continuity, or other calculus topics.";

pub const GENERAL_ANSWER: &str = "Calculus is the mathematical study of continuous change and consists of two main branches: differential calculus (concerning rates of change and slopes of curves) and integral calculus (concerning accumulation of quantities and areas under curves). For more specific information, ask about derivatives, integrals, limits, or other calculus concepts.";

static VOCABULARY: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    CONCEPT_KEYWORDS
        .iter()
        .flat_map(|(_, words)| words.iter().copied())
        .collect()
});

/// Function words ignored by `tokenize`.
static STOPWORDS: [&str; 32] = [
    "a", "about", "an", "and", "are", "be", "do", "does", "explain", "for", "how", "i", "in",
    "is", "it", "me", "mean", "near", "of", "on", "or", "tell", "that", "the", "there", "this",
    "to", "what", "who", "why", "with", "you",
];

/// Lowercased alphanumeric runs, stopwords removed.
///
/// A word outside the vocabulary is retried without one trailing `s` ("derivatives"). Words
/// that still miss stay in the query as they are: they weigh on its norm but match no concept.
fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty() && !STOPWORDS.contains(word))
        .map(|word| {
            VOCABULARY
                .get(word)
                .or_else(|| word.strip_suffix('s').and_then(|stem| VOCABULARY.get(stem)))
                .map_or_else(|| word.to_string(), |known| known.to_string())
        })
        .collect()
}

fn term_frequencies<'a>(words: impl IntoIterator<Item = &'a str>) -> BTreeMap<&'a str, f64> {
    let mut tf = BTreeMap::new();
    for word in words {
        *tf.entry(word).or_insert(0.0) += 1.0;
    }
    tf
}

fn cosine_similarity(a: &BTreeMap<&str, f64>, b: &BTreeMap<&str, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(word, wa)| b.get(word).map(|wb| wa * wb))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Similarity of the query to every concept, in table order.
pub fn concept_scores(query: &str) -> Vec<(&'static str, f64)> {
    let tokens = tokenize(query);
    let query_tf = term_frequencies(tokens.iter().map(String::as_str));
    CONCEPT_KEYWORDS
        .iter()
        .map(|(concept, words)| {
            let concept_tf = term_frequencies(words.iter().copied());
            (*concept, cosine_similarity(&query_tf, &concept_tf))
        })
        .collect()
}

/// Explanation of the concept closest to the query, or the generic fallback when nothing
/// scores at least [`SIMILARITY_THRESHOLD`].
/// # Examples
/// ```rust, ignore
/// assert!(describe_concept("what are derivatives?").starts_with("The derivative measures"));
/// ```
pub fn describe_concept(query: &str) -> &'static str {
    let mut best: Option<(&str, f64)> = None;
    for (concept, score) in concept_scores(query) {
        // ties keep the earlier concept
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((concept, score));
        }
    }
    match best {
        Some((concept, score)) if score >= SIMILARITY_THRESHOLD => {
            debug!("query '{}' matched '{}' with score {:.3}", query, concept, score);
            CALCULUS_CONCEPTS
                .iter()
                .find(|(name, _)| *name == concept)
                .map(|(_, text)| *text)
                .unwrap_or(CONCEPT_FALLBACK)
        }
        _ => CONCEPT_FALLBACK,
    }
}

/// Keyword scan over a free-form question.
pub fn answer_calculus_question(question: &str) -> &'static str {
    let question = question.to_lowercase();
    for (concept, phrases) in QUESTION_KEYWORDS.iter() {
        if phrases.iter().any(|phrase| question.contains(phrase)) {
            return describe_concept(concept);
        }
    }
    GENERAL_ANSWER
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn text_of(concept: &str) -> &'static str {
        CALCULUS_CONCEPTS
            .iter()
            .find(|(name, _)| *name == concept)
            .map(|(_, text)| *text)
            .unwrap()
    }

    #[test]
    fn test_concept_names_resolve_to_themselves() {
        for (concept, _) in CALCULUS_CONCEPTS.iter() {
            assert_eq!(describe_concept(concept), text_of(concept));
        }
    }

    #[test]
    fn test_plural_and_questions() {
        assert_eq!(describe_concept("What are derivatives?"), text_of("derivative"));
        assert_eq!(describe_concept("Explain LIMITS"), text_of("limit"));
        assert_eq!(describe_concept("taylor series"), text_of("series"));
        assert_eq!(describe_concept("what is the rate of change"), text_of("derivative"));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(describe_concept("hello there"), CONCEPT_FALLBACK);
        assert_eq!(describe_concept(""), CONCEPT_FALLBACK);
    }

    #[test]
    fn test_off_topic_sentence_with_one_keyword_falls_back() {
        let sentence = "who painted the famous mural on the slope of the old church near the river";
        assert_eq!(describe_concept(sentence), CONCEPT_FALLBACK);
        // seven content words, one of them in the derivative bag
        let scores = concept_scores(sentence);
        assert_relative_eq!(scores[0].1, 1.0 / 35f64.sqrt());
        assert_eq!(describe_concept("the slope"), text_of("derivative"));
    }

    #[test]
    fn test_scores() {
        let scores = concept_scores("slope");
        assert_eq!(scores.len(), 7);
        assert_relative_eq!(scores[0].1, 1.0 / 5f64.sqrt());
        assert!(scores[1..].iter().all(|(_, score)| *score == 0.0));
    }

    #[test]
    fn test_answer_calculus_question() {
        assert_eq!(answer_calculus_question("How do I find the area under a curve?"), text_of("integral"));
        assert_eq!(answer_calculus_question("What does it mean to be continuous?"), text_of("continuity"));
        assert_eq!(answer_calculus_question("where is the peak"), text_of("extrema"));
        assert_eq!(answer_calculus_question("What is calculus?"), GENERAL_ANSWER);
    }

    #[test]
    fn test_question_order_matters() {
        // "slope" is listed under derivative before "area" under integral
        assert_eq!(answer_calculus_question("slope and area"), text_of("derivative"));
    }
}
