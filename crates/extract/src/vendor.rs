use regex::RegexBuilder;

/// Sentinel returned when no signature matches.
pub const UNKNOWN_VENDOR: &str = "unknown";

/// One (vendor name, recognition pattern) pair. The signature set is static
/// configuration: built once, never mutated at runtime.
#[derive(Debug, Clone)]
pub struct VendorSignature {
    pub name: String,
    pub pattern: String,
}

impl VendorSignature {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self { name: name.into(), pattern: pattern.into() }
    }
}

/// Pairs a signature with its precompiled case-insensitive regex.
struct CompiledSignature {
    name: String,
    regex: regex::Regex,
}

/// Ordered, case-insensitive first-match-wins classifier. Iteration order is
/// the insertion order of the signature set, so classification is
/// reproducible even when patterns overlap. Stateless per call.
pub struct VendorClassifier {
    signatures: Vec<CompiledSignature>,
}

impl VendorClassifier {
    /// Build from an ordered signature list. A signature whose pattern does
    /// not compile is skipped — a bad entry must not take down the set.
    pub fn new(signatures: Vec<VendorSignature>) -> Self {
        let signatures = signatures
            .into_iter()
            .filter_map(|sig| {
                match RegexBuilder::new(&sig.pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(CompiledSignature { name: sig.name, regex }),
                    Err(err) => {
                        tracing::warn!(vendor = %sig.name, %err, "skipping unparseable vendor signature");
                        None
                    }
                }
            })
            .collect();
        Self { signatures }
    }

    /// The stock signature set for the invoice corpus this pipeline was
    /// built against.
    pub fn with_default_signatures() -> Self {
        Self::new(vec![
            VendorSignature::new("Amazon", r"amazon\.com/invoice"),
            VendorSignature::new("Stripe", r"stripe\s+invoice"),
            VendorSignature::new("PayPal", r"paypal\.com/invoice"),
        ])
    }

    /// First vendor whose pattern matches `text`, else [`UNKNOWN_VENDOR`].
    pub fn classify<'a>(&'a self, text: &str) -> &'a str {
        self.signatures
            .iter()
            .find(|sig| sig.regex.is_match(text))
            .map(|sig| sig.name.as_str())
            .unwrap_or(UNKNOWN_VENDOR)
    }
}

impl Default for VendorClassifier {
    fn default() -> Self {
        Self::with_default_signatures()
    }
}
