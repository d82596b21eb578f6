use crate::{BooleanIndex, DocId};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Normalisation applied before terms reach the index. Everything is off by
/// default: the index itself never normalises.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    /// NFKC-normalise and lowercase.
    pub lowercase: bool,
    /// English Snowball stemming.
    pub stem: bool,
    /// Drop English stopwords (compared case-insensitively).
    pub remove_stopwords: bool,
}

fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Split text into word tokens, in order of appearance.
pub fn tokenize(text: &str, opts: &TokenizerOptions) -> Vec<String> {
    let normalized = if opts.lowercase {
        text.nfkc().collect::<String>().to_lowercase()
    } else {
        text.to_string()
    };
    let mut tokens = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if opts.remove_stopwords && is_stopword(&token.to_lowercase()) { continue; }
        if opts.stem {
            tokens.push(STEMMER.stem(token).to_string());
        } else {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Feed one document per line into `index`. Document ids are the line number
/// plus `first_doc`. Returns the id the next line would get.
pub fn index_lines<'a, I>(index: &mut BooleanIndex<DocId>, lines: I, first_doc: DocId, opts: &TokenizerOptions) -> DocId
where
    I: IntoIterator<Item = &'a str>,
{
    let mut doc = first_doc;
    for line in lines {
        for term in tokenize(line, opts) {
            index.add_term_occurrence(&term, doc);
        }
        doc += 1;
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_tokens_by_default() {
        let t = tokenize("We are, and always will be, the United States of America.", &TokenizerOptions::default());
        assert_eq!(t.first().map(String::as_str), Some("We"));
        assert!(t.contains(&"United".to_string()));
        assert!(!t.iter().any(|w| w == ","));
    }

    #[test]
    fn full_normalisation() {
        let opts = TokenizerOptions { lowercase: true, stem: true, remove_stopwords: true };
        let t = tokenize("Running, runner's run! The Cats", &opts);
        assert!(t.iter().any(|w| w == "run"));
        assert!(t.iter().any(|w| w == "cat"));
        assert!(!t.iter().any(|w| w == "the"));
    }

    #[test]
    fn lines_become_documents() {
        let mut index = BooleanIndex::new();
        let next = index_lines(&mut index, ["a b", "", "b c"], 10, &TokenizerOptions::default());
        assert_eq!(next, 13);
        // The blank line registers nothing.
        assert_eq!(index.documents(), vec![10, 12]);
        assert_eq!(index.terms(), vec!["a", "b", "c"]);
    }
}
