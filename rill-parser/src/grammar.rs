// Rill Grammar Table
// Declarative operator registration consumed by both the tokenizer
// (symbol recognition) and the precedence parser (parsing behavior).

use crate::ast::Node;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The symbol that introduces lambda bodies. The indentation pass
/// treats it specially when synthesizing implicit block markers.
pub const LAMBDA: &str = "->";

/// How a symbol begins an expression.
#[derive(Debug, Clone, Copy)]
pub enum Nud {
    /// Consume one operand parsed at `rbp` and wrap it.
    Prefix { rbp: u32, build: fn(Node) -> Node },
    /// Produce a fixed leaf, consuming nothing.
    Action { build: fn() -> Node },
    /// Parse a full sub-expression up to the matching `close` symbol.
    Brackets {
        close: &'static str,
        build: fn(Node) -> Node,
    },
}

/// How a symbol continues an expression after a left operand.
#[derive(Debug, Clone, Copy)]
pub enum Led {
    /// Consume a right operand parsed at `rbp` and combine.
    /// Right-associative operators register `rbp` one below their
    /// binding power so equal-precedence chains nest to the right.
    Infix {
        rbp: u32,
        build: fn(Node, Node) -> Node,
    },
    /// Wrap the left operand, consuming nothing further.
    Postfix { build: fn(Node) -> Node },
    /// Parse a bracketed sub-expression up to `close` and combine it
    /// with the left operand.
    Subscript {
        close: &'static str,
        build: fn(Node, Node) -> Node,
    },
}

/// One registered operator or keyword.
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub text: &'static str,
    /// Left binding power: how tightly the symbol binds to an operand
    /// on its left. Higher binds tighter.
    pub lbp: u32,
    pub nud: Option<Nud>,
    pub led: Option<Led>,
}

/// Registry of every symbol the language knows.
///
/// Registering the same text twice merges: the binding power is the
/// maximum of both registrations and each denotation slot may be
/// filled once. Filling an already-filled slot is a conflicting
/// grammar definition and panics at registration time.
#[derive(Debug, Default)]
pub struct Grammar {
    symbols: HashMap<&'static str, Symbol>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, text: &'static str, lbp: u32) -> &mut Symbol {
        let sym = self.symbols.entry(text).or_insert(Symbol {
            text,
            lbp: 0,
            nud: None,
            led: None,
        });
        sym.lbp = sym.lbp.max(lbp);
        sym
    }

    fn set_nud(&mut self, text: &'static str, lbp: u32, nud: Nud) {
        let sym = self.entry(text, lbp);
        if sym.nud.is_some() {
            panic!("conflicting null denotation registered for '{text}'");
        }
        sym.nud = Some(nud);
    }

    fn set_led(&mut self, text: &'static str, lbp: u32, led: Led) {
        let sym = self.entry(text, lbp);
        if sym.led.is_some() {
            panic!("conflicting left denotation registered for '{text}'");
        }
        sym.led = Some(led);
    }

    /// Register a prefix operator: `text` followed by an operand
    /// parsed at `rbp`.
    pub fn prefix(&mut self, text: &'static str, rbp: u32, build: fn(Node) -> Node) {
        self.set_nud(text, 0, Nud::Prefix { rbp, build });
    }

    /// Register a zero-arity symbol producing a fixed leaf.
    pub fn action(&mut self, text: &'static str, build: fn() -> Node) {
        self.set_nud(text, 0, Nud::Action { build });
    }

    /// Register a left-associative infix operator.
    pub fn infix(&mut self, text: &'static str, lbp: u32, build: fn(Node, Node) -> Node) {
        self.set_led(text, lbp, Led::Infix { rbp: lbp, build });
    }

    /// Register a right-associative infix operator.
    pub fn infix_r(&mut self, text: &'static str, lbp: u32, build: fn(Node, Node) -> Node) {
        self.set_led(text, lbp, Led::Infix {
            rbp: lbp - 1,
            build,
        });
    }

    /// Register a postfix operator wrapping its left operand.
    pub fn postfix(&mut self, text: &'static str, lbp: u32, build: fn(Node) -> Node) {
        self.set_led(text, lbp, Led::Postfix { build });
    }

    /// Register a bracket pair. The closing symbol is registered as a
    /// bare terminator with no parsing behavior of its own.
    pub fn brackets(&mut self, open: &'static str, close: &'static str, build: fn(Node) -> Node) {
        self.set_nud(open, 0, Nud::Brackets { close, build });
        self.entry(close, 0);
    }

    /// Register a postfix subscript pair, e.g. `a[i]`. Subscripts bind
    /// tighter than every ordinary operator.
    pub fn subscript(&mut self, open: &'static str, close: &'static str, build: fn(Node, Node) -> Node) {
        self.set_led(open, 1000, Led::Subscript { close, build });
        self.entry(close, 0);
    }

    pub fn get(&self, text: &str) -> Option<&Symbol> {
        self.symbols.get(text)
    }

    pub fn lbp(&self, text: &str) -> u32 {
        self.symbols.get(text).map(|s| s.lbp).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Longest registered symbol that prefixes `rest`, if any. The
    /// tokenizer uses this to split a run of operator characters, so
    /// `==` wins over `=` and `=~` over `=`.
    pub fn match_longest(&self, rest: &str) -> Option<&'static str> {
        let mut best: Option<&'static str> = None;
        for &text in self.symbols.keys() {
            if rest.starts_with(text) && best.map_or(true, |b| text.len() > b.len()) {
                best = Some(text);
            }
        }
        best
    }

    /// Exact lookup of an identifier-shaped word (`p`, `match`, ...)
    /// so keywords are recognized without being hard-wired into the
    /// lexical grammar.
    pub fn word_symbol(&self, word: &str) -> Option<&'static str> {
        self.symbols.get(word).map(|s| s.text)
    }
}

/// The default rill operator set. Binding powers: higher binds
/// tighter; right-associative operators are registered with
/// `infix_r`.
fn default_grammar() -> Grammar {
    let mut g = Grammar::new();

    // Special forms
    g.prefix("p", 0, |a| Node::Print(Box::new(a)));
    g.prefix("assert", 0, |a| Node::Assert(Box::new(a)));
    g.action("_", || Node::AlwaysTrue);

    // Unary
    g.prefix("-", 100, |a| Node::Neg(Box::new(a)));
    g.prefix("+", 100, |a| Node::Pos(Box::new(a)));
    g.prefix("match", 1, |a| Node::Match(Box::new(a)));
    g.prefix(LAMBDA, 2, |a| Node::Lambda0(Box::new(a)));
    g.postfix("!", 3, |a| Node::Call0(Box::new(a)));

    // Binary
    g.infix("+", 10, |l, r| Node::Add(Box::new(l), Box::new(r)));
    g.infix("-", 10, |l, r| Node::Sub(Box::new(l), Box::new(r)));
    g.infix("*", 20, |l, r| Node::Mul(Box::new(l), Box::new(r)));
    g.infix_r("^", 30, |l, r| Node::Pow(Box::new(l), Box::new(r)));
    g.infix_r("=", 1, |l, r| Node::Assign(Box::new(l), Box::new(r)));
    g.infix_r("==", 2, |l, r| Node::Eq(Box::new(l), Box::new(r)));
    g.infix("<", 2, |l, r| Node::Less(Box::new(l), Box::new(r)));
    g.infix(">", 2, |l, r| Node::More(Box::new(l), Box::new(r)));
    g.infix("=>", 1, |l, r| Node::IfThen {
        cond: Box::new(l),
        then: Box::new(r),
    });
    g.infix("=~", 3, |l, r| Node::RegMatch(Box::new(l), Box::new(r)));
    g.infix(LAMBDA, 2, |l, r| Node::Lambda {
        params: Box::new(l),
        body: Box::new(r),
    });
    g.infix_r("@", 50, |l, r| Node::Call {
        func: Box::new(l),
        args: Box::new(r),
    });
    g.infix_r(".", 40, |l, r| Node::ComposeR(Box::new(l), Box::new(r)));
    g.infix("$", 4, |l, r| Node::Compose(Box::new(l), Box::new(r)));

    // Grouping
    g.brackets("(", ")", |a| Node::Parens(Box::new(a)));
    g.brackets("[", "]", |a| Node::Brackets(Box::new(a)));
    g.subscript("[", "]", |l, r| Node::Index(Box::new(l), Box::new(r)));

    // List building
    g.infix(",", 1, |l, r| match l {
        Node::Comma(mut items) => {
            items.push(r);
            Node::Comma(items)
        }
        single => Node::Comma(vec![single, r]),
    });

    g
}

/// Process-wide grammar table, built once and read-only thereafter.
pub static GRAMMAR: Lazy<Grammar> = Lazy::new(default_grammar);
