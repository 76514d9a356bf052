//! Declarative option validation for command invocations.
//!
//! Commands receive a flat mapping of option name → scalar value
//! ([`Options`]), built per invocation from parsed CLI arguments and
//! discarded afterwards. Instead of each command hand-rolling its checks,
//! a command supplies a small [`Schema`] (exactly-one-of groups, required
//! options, shape constraints) and one generic `validate` routine
//! evaluates it. Validation failures surface as descriptive strings before
//! any network call is made.
//!
//! The "missing required selection" policy is explicit and configurable
//! via [`ValidationPolicy`]: by default, supplying neither option of an
//! exactly-one-of selector group is a validation-time error. When the
//! group is marked deferrable and the policy defers, the absence passes
//! validation and the resolver later presents candidates interactively.
//! Supplying more than one option of the group is an error regardless of
//! policy.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// ── Option values ──────────────────────────────────────────────────────

/// A scalar option value. Options are flat — no nesting, no arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// A string-valued option, e.g. `--name "CLI Test Group"`.
    Str(String),
    /// A boolean flag, e.g. `--force`.
    Bool(bool),
    /// A numeric option.
    Number(i64),
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Str(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Number(v)
    }
}

/// The option bag for one command invocation.
///
/// A thin wrapper over a sorted map so error messages and iteration are
/// deterministic. Created per invocation, discarded after.
#[derive(Debug, Default)]
pub struct Options {
    values: BTreeMap<&'static str, OptionValue>,
}

impl Options {
    /// Creates an empty option bag.
    pub fn new() -> Self {
        Options::default()
    }

    /// Inserts an option value. Builder-style so commands can chain.
    pub fn set(mut self, name: &'static str, value: impl Into<OptionValue>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    /// Inserts an option only when the caller actually supplied it.
    /// `None` leaves the bag untouched, which is how "option absent"
    /// is represented.
    pub fn set_opt(mut self, name: &'static str, value: Option<impl Into<OptionValue>>) -> Self {
        if let Some(v) = value {
            self.values.insert(name, v.into());
        }
        self
    }

    /// True when the caller supplied the option. A `false` flag still
    /// counts as supplied only if it was inserted; commands insert flags
    /// via [`Options::set`] unconditionally and selectors via
    /// [`Options::set_opt`].
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the string value of an option, if present and string-typed.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a boolean flag. Absent flags read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }
}

// ── Shape constraints ──────────────────────────────────────────────────

static GUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("GUID regex is valid")
});

// Deliberately loose: rejects whitespace and missing @/dot rather than
// attempting full RFC 5321 address validation, matching how Microsoft
// tooling treats UPNs.
static UPN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("UPN regex is valid"));

static ABSOLUTE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s]+$").expect("URL regex is valid"));

/// Format constraint applied to an identifier-shaped option.
///
/// Shapes fail malformed input *before* any network call so the API never
/// sees an identifier we already know cannot match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A GUID/UUID, e.g. `9b1b1e42-794b-4c71-93ac-5ed92488b67f`.
    Guid,
    /// A User Principal Name — an email-shaped user identifier.
    Upn,
    /// An absolute `http(s)://` URL.
    AbsoluteUrl,
}

impl Shape {
    /// True when the value matches the shape.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Shape::Guid => GUID_RE.is_match(value),
            Shape::Upn => UPN_RE.is_match(value),
            Shape::AbsoluteUrl => ABSOLUTE_URL_RE.is_match(value),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Shape::Guid => "GUID",
            Shape::Upn => "user principal name (UPN)",
            Shape::AbsoluteUrl => "absolute URL",
        }
    }
}

// ── Schema ─────────────────────────────────────────────────────────────

/// One validation rule. Commands compose rules via the [`Schema`] builder.
#[derive(Debug, Clone)]
enum Rule {
    /// Exactly one of the listed options must be supplied. When
    /// `deferrable` and the active policy defers, supplying none is
    /// allowed through (the resolver prompts later); supplying more than
    /// one is always an error.
    ExactlyOneOf {
        options: &'static [&'static str],
        deferrable: bool,
    },
    /// The option must be supplied.
    Required(&'static str),
    /// When supplied, the option's value must match the shape.
    Shape {
        option: &'static str,
        shape: Shape,
    },
}

/// Controls how validation treats missing required selection criteria.
///
/// `defer_missing_selection` reproduces the configurable "prompt" setting:
/// when `true`, a deferrable exactly-one-of group with no option supplied
/// passes validation and the resolver presents candidates interactively
/// instead. It is only sensible to enable this for interactive
/// invocations; `main` wires it off whenever prompts are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPolicy {
    /// Defer "no selector supplied" to an interactive pick instead of
    /// failing validation.
    pub defer_missing_selection: bool,
}

/// A command's declarative option schema.
///
/// Evaluated by [`Schema::validate`]; rules run in insertion order and the
/// first failure wins, so commands should list selector rules before
/// shape rules for the most useful message.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<Rule>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Exactly one of `options` must be supplied.
    pub fn exactly_one_of(mut self, options: &'static [&'static str]) -> Self {
        self.rules.push(Rule::ExactlyOneOf {
            options,
            deferrable: false,
        });
        self
    }

    /// Exactly one of `options` must be supplied, unless the policy defers
    /// missing selections to an interactive pick.
    pub fn exactly_one_of_or_pick(mut self, options: &'static [&'static str]) -> Self {
        self.rules.push(Rule::ExactlyOneOf {
            options,
            deferrable: true,
        });
        self
    }

    /// The option must always be supplied.
    pub fn required(mut self, option: &'static str) -> Self {
        self.rules.push(Rule::Required(option));
        self
    }

    /// When supplied, the option must match the shape.
    pub fn shape(mut self, option: &'static str, shape: Shape) -> Self {
        self.rules.push(Rule::Shape { option, shape });
        self
    }

    /// Evaluates every rule against the option bag.
    ///
    /// Returns `Ok(())` or the first descriptive failure string. Callers
    /// wrap the string in `CliError::Validation`.
    pub fn validate(
        &self,
        opts: &Options,
        policy: &ValidationPolicy,
    ) -> std::result::Result<(), String> {
        for rule in &self.rules {
            match rule {
                Rule::ExactlyOneOf {
                    options,
                    deferrable,
                } => {
                    let supplied: Vec<&str> =
                        options.iter().copied().filter(|o| opts.has(o)).collect();
                    match supplied.len() {
                        1 => {}
                        0 if *deferrable && policy.defer_missing_selection => {}
                        0 => {
                            return Err(format!(
                                "Specify one of the following options: {}.",
                                options.join(", ")
                            ));
                        }
                        _ => {
                            return Err(format!(
                                "Specify only one of the following options: {}.",
                                options.join(", ")
                            ));
                        }
                    }
                }
                Rule::Required(option) => {
                    if !opts.has(option) {
                        return Err(format!("Required option '{option}' is missing."));
                    }
                }
                Rule::Shape { option, shape } => {
                    if let Some(value) = opts.get_str(option) {
                        if !shape.matches(value) {
                            return Err(format!(
                                "'{value}' is not a valid {} for option '{option}'.",
                                shape.describe()
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
