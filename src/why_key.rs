//! # Why-Key Grammar
//!
//! Decodes the engine's compact why-key (for example
//! `+ADDRESS+NAME(EMPLOYER:APPLICANT)`) into an ordered mapping of
//! domain -> direction -> roles.
//!
//! Domain tokens are separated by `+` or `-`. A parenthetical after a domain
//! lists its inbound roles, then after `:` its outbound roles, with `,`
//! between roles. Every input yields some result; there is no reject path.

use crate::model::{RelationDirection, RoleSet};
use std::collections::BTreeMap;

/// Roles declared for one domain, keyed by `Inbound` / `Outbound`.
pub type DirectionRoles = BTreeMap<RelationDirection, RoleSet>;

/// One domain entry of a parsed why-key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainRoles {
    pub domain: String,
    pub roles: DirectionRoles,
}

/// Parsed why-key: domains in first-seen order.
///
/// A domain with no parenthetical still appears, with an empty role map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhyKeyGrammar {
    entries: Vec<DomainRoles>,
}

impl WhyKeyGrammar {
    /// Parse a why-key. Empty or whitespace-only input yields an empty grammar.
    pub fn parse(why_key: &str) -> Self {
        why_key
            .chars()
            .fold(ParseState::default(), ParseState::step)
            .finish()
    }

    pub fn entries(&self) -> &[DomainRoles] {
        &self.entries
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.domain.as_str())
    }

    pub fn get(&self, domain: &str) -> Option<&DirectionRoles> {
        self.entries
            .iter()
            .find(|entry| entry.domain == domain)
            .map(|entry| &entry.roles)
    }

    pub fn roles(&self, domain: &str, direction: RelationDirection) -> Option<&RoleSet> {
        self.get(domain).and_then(|roles| roles.get(&direction))
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.get(domain).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render back to canonical why-key text: `A+B(in1,in2:out1)`.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let mut text = entry.domain.clone();
                if entry.roles.is_empty() {
                    return text;
                }
                text.push('(');
                if let Some(inbound) = entry.roles.get(&RelationDirection::Inbound) {
                    text.push_str(&inbound.iter().collect::<Vec<_>>().join(","));
                }
                if let Some(outbound) = entry.roles.get(&RelationDirection::Outbound) {
                    text.push(':');
                    text.push_str(&outbound.iter().collect::<Vec<_>>().join(","));
                }
                text.push(')');
                text
            })
            .collect::<Vec<_>>()
            .join("+")
    }

    fn ensure_domain(&mut self, domain: &str) -> &mut DomainRoles {
        let index = match self.entries.iter().position(|entry| entry.domain == domain) {
            Some(index) => index,
            None => {
                self.entries.push(DomainRoles {
                    domain: domain.to_string(),
                    roles: DirectionRoles::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    fn add_role(&mut self, domain: &str, direction: RelationDirection, role: &str) {
        self.ensure_domain(domain)
            .roles
            .entry(direction)
            .or_default()
            .insert(role);
    }
}

/// An open parenthetical. `domain` is `None` when the parenthetical had no
/// domain token in front of it; its roles are dropped.
#[derive(Debug)]
struct RoleSection {
    domain: Option<String>,
    direction: RelationDirection,
}

#[derive(Debug, Default)]
struct ParseState {
    grammar: WhyKeyGrammar,
    buffer: String,
    section: Option<RoleSection>,
}

impl ParseState {
    fn step(mut self, c: char) -> Self {
        match (c, self.section.is_some()) {
            ('+' | '-', false) => {
                self.take_domain_token();
            }
            ('(', false) => {
                let domain = self.take_domain_token();
                self.section = Some(RoleSection {
                    domain,
                    direction: RelationDirection::Inbound,
                });
            }
            (',', true) => self.take_role(),
            (':', true) => {
                self.take_role();
                if let Some(section) = self.section.as_mut() {
                    section.direction = RelationDirection::Outbound;
                }
            }
            (')', true) => {
                self.take_role();
                self.section = None;
            }
            // Role punctuation outside a parenthetical discards the pending token.
            (',' | ':' | ')', false) => self.buffer.clear(),
            _ => self.buffer.push(c),
        }
        self
    }

    fn finish(mut self) -> WhyKeyGrammar {
        if self.section.is_some() {
            self.take_role();
        } else {
            self.take_domain_token();
        }
        self.grammar
    }

    /// Register the buffered domain token (if any) and return it.
    fn take_domain_token(&mut self) -> Option<String> {
        let token = std::mem::take(&mut self.buffer);
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        self.grammar.ensure_domain(token);
        Some(token.to_string())
    }

    fn take_role(&mut self) {
        let role = std::mem::take(&mut self.buffer);
        let role = role.trim();
        if role.is_empty() {
            return;
        }
        if let Some(RoleSection {
            domain: Some(domain),
            direction,
        }) = &self.section
        {
            self.grammar.add_role(domain, *direction, role);
        }
    }
}
