use regex::Regex;

pub const UNCLASSIFIED_PATTERNS: &[&str] = &[
    r"-like\b",
    r"\bactinomycete\b",
    r"\bcrenarchaeote\b",
    r"\bculture\b",
    r"\bchimeric\b",
    r"\bcyanobiont\b",
    r"degrading",
    r"\beuryarchaeote\b",
    r"disease",
    r"\b[cC]lone",
    r"\bmethanogen(ic)?\b",
    r"\bplanktonic\b",
    r"\bplanctomycete\b",
    r"\bsymbiote\b",
    r"\btransconjugant\b",
    // starts with a lower-case character
    r"^[a-z]",
    // digit in second word
    r"^\W+\s+[a-zA-Z]*\d",
    r"\d\d",
    r"atypical",
    r"^cf\.",
    r"acidophile",
    r"\bactinobacterium\b",
    r"aerobic",
    r".+\b[Al]g(um|a)\b",
    r"\b[Bb]acteri(um|al)\b",
    r".+\b[Bb]acteria\b",
    r"Barophile",
    r"cyanobacterium",
    r"Chloroplast",
    r"Cloning",
    r"\bclone\b",
    r"cluster",
    r"^diazotroph",
    r"\bcoccus\b",
    r"archaeon",
    r"-containing",
    r"epibiont",
    r"environmental samples",
    r"eubacterium",
    r"\b[Gg]roup\b",
    r"halophilic",
    r"hydrothermal\b",
    r"isolate",
    r"\bmarine\b",
    r"methanotroph",
    r"microorganism",
    r"mollicute",
    r"pathogen",
    r"[Pp]hytoplasma",
    r"proteobacterium",
    r"putative",
    r"\bsp\.",
    r"species",
    r"spirochete",
    r"str\.",
    r"strain",
    r"symbiont",
    r"\b[Tt]axon\b",
    r"unicellular",
    r"uncultured",
    r"unclassified",
    r"unidentified",
    r"unknown",
    r"vector\b",
    r"vent\b",
];

pub fn unclassified_regex() -> Result<Regex, regex::Error> {
    Regex::new(&UNCLASSIFIED_PATTERNS.join("|"))
}
