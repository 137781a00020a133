//! Phrase interpolation
//!
//! Fixed placeholder set: `{speaker}` and `{topic}`. Anything else inside
//! braces is copied through untouched.

/// Values substituted into trigger phrases
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub speaker: &'a str,
    pub topic: &'a str,
}

impl<'a> TemplateVars<'a> {
    pub fn new(speaker: &'a str, topic: &'a str) -> Self {
        Self { speaker, topic }
    }

    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "speaker" => Some(self.speaker),
            "topic" => Some(self.topic),
            _ => None,
        }
    }
}

/// Substitute known placeholders in `template`
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match vars.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_placeholders() {
        let vars = TemplateVars::new("Ada", "rollout");
        assert_eq!(
            render("Building on {speaker}'s point about {topic},", &vars),
            "Building on Ada's point about rollout,"
        );
        assert_eq!(render("{topic} {topic}", &vars), "rollout rollout");
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_untouched() {
        let vars = TemplateVars::new("Ada", "rollout");
        assert_eq!(render("Hi {name}, {speaker}", &vars), "Hi {name}, Ada");
        assert_eq!(render("broken {speaker", &vars), "broken {speaker");
        assert_eq!(render("no placeholders", &vars), "no placeholders");
    }
}
