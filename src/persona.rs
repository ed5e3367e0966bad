use rand::Rng;

/// Language family detected in the input. Detection is substring-based and
/// best-effort; it only steers the wording of a few replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    React,
    Python,
    Java,
    JavaScript,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Language::React => "react",
            Language::Python => "python",
            Language::Java => "java",
            Language::JavaScript => "javascript",
        }
    }
}

/// Error subtype, refined from the input after a generic error mention is
/// found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NullPointer,
    Syntax,
    Type,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeAnalysis {
    pub language: Option<Language>,
    pub error: Option<ErrorKind>,
}

pub const REPLY_HOOK: &str = "Doc: Check the dependency array. Empty [] runs once, [value] re-runs on change. Leave it off entirely and you've built yourself an infinite render loop.";
pub const REPLY_STATE: &str = "Doc: Don't mutate state in place. The framework diffs by reference, so hand the setter a new value or nothing re-renders.";
pub const REPLY_PROPS: &str = "Doc: Props flow down, events bubble up. Destructure them at the top of the component and type them properly while you're at it.";
pub const REPLY_COMPONENT: &str = "Doc: Keep components pure. Side effects go in effect hooks, state changes go in handlers. Mixing those is how renders go feral.";
pub const REPLY_ASYNC: &str = "Doc: If you forgot the await, you're holding a promise, not a value. Pick try/catch or .catch() and stick with it.";
pub const REPLY_LOOP: &str = "Doc: Infinite loop. Check the increment and the exit condition before you blame the machine.";
pub const REPLY_NULL_POINTER: &str = "Doc: Null reference. Guard the access before you dereference, or use optional chaining if the language gives you any.";
pub const REPLY_SYNTAX: &str = "Doc: Syntax error. Missing bracket or semicolon, most likely. Your editor is already pointing at it in red.";
pub const REPLY_TYPE: &str = "Doc: Type error. A string is not a number is not an array. Check what you're actually passing before it crosses that boundary.";
pub const REPLY_RUNTIME: &str = "Doc: Read the error message. Top line first, then the first stack frame that's your code. Ninety percent of debugging is reading.";
pub const REPLY_PERF: &str = "Doc: Profile first. Memoize the hot paths after the profiler says they're hot, not before. Premature optimization just moves the bug.";
pub const REPLY_NETWORK: &str = "Doc: A fetch returns a promise. Await it, check the status, handle the failure path, and show a loading state while you wait.";
pub const REPLY_DEBUG: &str = "Doc: Print statements are fine, breakpoints are better. Use the devtools you already have open.";
pub const REPLY_STYLE: &str = "Doc: Flexbox. Direction, justify, align. Stop absolutely positioning everything like it's 1999.";
pub const REPLY_HELP: &str = "Doc: Be specific. What language, what error, what did you expect to happen? I don't guess.";
pub const REPLY_GREETING: &str = "Doc: Yeah, hello. What's broken? Paste the code and the error and we'll get somewhere.";
pub const REPLY_THANKS: &str = "Doc: Don't mention it. Ship it, and come back when something else breaks.";
pub const REPLY_CODE_SHAPE: &str = "Doc: I see code. What's it doing wrong? Runtime error, wrong output, won't compile? Give me context.";

/// Fallback pool for inputs no rule matches. Selection is a uniform random
/// pick; with a real RNG this path is non-deterministic by design, which is
/// why tests drive it with a seeded generator.
pub const FALLBACK_REPLIES: &[&str] = &[
    "Doc: Analyzing... what's the specific issue? Be precise.",
    "Doc: Interesting. Tell me what you're actually trying to do.",
    "Doc: Give me the error message. Expected versus actual. That's the whole job.",
    "Doc: I need more to go on. Paste the code, the input, and what came out.",
    "Doc: Noted. Now tell me what's actually wrong with it.",
];

/// Classify the input: dominant language family plus error subtype. Pure
/// substring membership over the lower-cased input.
pub fn analyze(query: &str) -> CodeAnalysis {
    let q = query.to_lowercase();

    let language = if q.contains("react") || q.contains("jsx") || q.contains("tsx") {
        Some(Language::React)
    } else if q.contains("python") || q.contains("def ") || q.contains("import ") {
        Some(Language::Python)
    } else if q.contains("java") || q.contains("class ") || q.contains("public ") {
        Some(Language::Java)
    } else if q.contains("javascript") || q.contains("const ") || q.contains("let ") {
        Some(Language::JavaScript)
    } else {
        None
    };

    let error = if q.contains("error") || q.contains("exception") {
        if q.contains("null") || q.contains("undefined") {
            Some(ErrorKind::NullPointer)
        } else if q.contains("syntax") {
            Some(ErrorKind::Syntax)
        } else if q.contains("type") {
            Some(ErrorKind::Type)
        } else {
            Some(ErrorKind::Runtime)
        }
    } else {
        None
    };

    CodeAnalysis { language, error }
}

/// Map an input string to a canned reply. Rules are evaluated strictly in
/// source order and the first match wins; unmatched input draws from the
/// fallback pool through the injected random source.
pub fn respond<R: Rng + ?Sized>(query: &str, rng: &mut R) -> String {
    let q = query.to_lowercase();
    let analysis = analyze(query);

    if q.contains("react") || q.contains("component") {
        if q.contains("useeffect") || q.contains("hook") {
            return REPLY_HOOK.to_string();
        }
        if q.contains("state") {
            return REPLY_STATE.to_string();
        }
        if q.contains("props") {
            return REPLY_PROPS.to_string();
        }
        return REPLY_COMPONENT.to_string();
    }

    if q.contains("async") || q.contains("promise") {
        return REPLY_ASYNC.to_string();
    }

    if q.contains("loop") || q.contains("infinite") {
        return REPLY_LOOP.to_string();
    }

    if let Some(kind) = analysis.error {
        return match kind {
            ErrorKind::NullPointer => REPLY_NULL_POINTER.to_string(),
            ErrorKind::Syntax => REPLY_SYNTAX.to_string(),
            ErrorKind::Type => REPLY_TYPE.to_string(),
            ErrorKind::Runtime => REPLY_RUNTIME.to_string(),
        };
    }

    if q.contains("optimize") || q.contains("performance") {
        return REPLY_PERF.to_string();
    }

    if q.contains("api") || q.contains("fetch") {
        return REPLY_NETWORK.to_string();
    }

    if q.contains("debug") || q.contains("console") {
        return REPLY_DEBUG.to_string();
    }

    if q.contains("css") || q.contains("style") {
        return REPLY_STYLE.to_string();
    }

    if q.contains("help") || q.contains("how") {
        return REPLY_HELP.to_string();
    }

    if q.contains("hello") || q.contains("hi") {
        return REPLY_GREETING.to_string();
    }

    if q.contains("thank") {
        return REPLY_THANKS.to_string();
    }

    // Code-shape detection: raw snippets pasted without a question.
    if q.contains('{') || q.contains("function") || q.contains("const") {
        return REPLY_CODE_SHAPE.to_string();
    }

    FALLBACK_REPLIES[rng.random_range(0..FALLBACK_REPLIES.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn null_error_maps_to_null_pointer_guidance() {
        assert_eq!(respond("I get a NULL error somewhere", &mut rng()), REPLY_NULL_POINTER);
        assert_eq!(respond("Error: cannot read undefined", &mut rng()), REPLY_NULL_POINTER);
    }

    #[test]
    fn syntax_error_maps_to_syntax_guidance() {
        assert_eq!(respond("there's a Syntax Error on line 3", &mut rng()), REPLY_SYNTAX);
    }

    #[test]
    fn bare_error_maps_to_runtime_guidance() {
        assert_eq!(respond("my program throws an error", &mut rng()), REPLY_RUNTIME);
    }

    #[test]
    fn component_branch_wins_over_error_branch() {
        // Component rules are evaluated before the error rules, so a query
        // mentioning both resolves through the component branch.
        assert_eq!(
            respond("my react app has a null error", &mut rng()),
            REPLY_COMPONENT
        );
        assert_eq!(
            respond("component throws an error in the hook", &mut rng()),
            REPLY_HOOK
        );
    }

    #[test]
    fn hook_rule_precedes_state_rule() {
        assert_eq!(
            respond("react useEffect state question", &mut rng()),
            REPLY_HOOK
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(respond("ASYNC trouble", &mut rng()), REPLY_ASYNC);
        assert_eq!(respond("Infinite LOOP again", &mut rng()), REPLY_LOOP);
    }

    #[test]
    fn fallback_is_deterministic_under_fixed_seed() {
        let input = "zzz";
        let first = respond(input, &mut rng());
        let second = respond(input, &mut rng());
        assert_eq!(first, second);
        assert!(FALLBACK_REPLIES.contains(&first.as_str()));
    }

    #[test]
    fn analyze_detects_language_and_error_subtype() {
        let a = analyze("react error: x is null");
        assert_eq!(a.language, Some(Language::React));
        assert_eq!(a.error, Some(ErrorKind::NullPointer));

        let b = analyze("python type error");
        assert_eq!(b.language, Some(Language::Python));
        assert_eq!(b.error, Some(ErrorKind::Type));

        let c = analyze("nothing of note");
        assert_eq!(c.language, None);
        assert_eq!(c.error, None);
    }
}
