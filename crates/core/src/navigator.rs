//! Keyboard navigation over a suggestion list.
//!
//! [`Navigator`] owns the highlighted-index cursor of one dropdown. Key
//! presses are translated into an [`Outcome`] that the caller applies (fill
//! the input, move focus, submit, hide the list). The four widgets in the
//! client differ in small ways; each is a [`NavigatorConfig`] preset.

/// Keys the dropdowns react to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Tab,
    Enter,
    Escape,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TabPolicy {
    /// Let the browser move focus as usual.
    PassThrough,
    /// Commit the highlighted entry; no-op when nothing is highlighted.
    CommitHighlighted,
    /// Commit the highlighted entry, or the first one when nothing is.
    CommitHighlightedOrFirst,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EnterPolicy {
    /// Commit the highlighted entry; no-op when nothing is highlighted.
    CommitHighlighted,
    /// Commit the highlighted entry, otherwise submit the typed query.
    CommitOrSubmit,
    /// Commit the highlighted entry if any, then always submit.
    CommitThenSubmit,
}

/// Behaviour of one dropdown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Arrow keys wrap around the ends instead of stopping there.
    pub wrap: bool,
    /// Cursor position whenever the list is (re)populated.
    pub initial: Option<usize>,
    /// ArrowDown on a hidden list asks the caller to open it.
    pub arrow_down_opens: bool,
    /// Keys pass through while the visible list is empty.
    pub requires_entries: bool,
    pub tab: TabPolicy,
    pub enter: EnterPolicy,
    pub advance_focus_on_tab: bool,
    pub advance_focus_on_enter: bool,
}

impl NavigatorConfig {
    /// Tag / area / container / bin inputs of the item form.
    pub fn input_widget() -> Self {
        Self {
            wrap: true,
            initial: Some(0),
            arrow_down_opens: true,
            requires_entries: true,
            tab: TabPolicy::CommitHighlighted,
            enter: EnterPolicy::CommitHighlighted,
            advance_focus_on_tab: true,
            advance_focus_on_enter: true,
        }
    }

    /// Location fields on the server-rendered edit page.
    pub fn legacy_form() -> Self {
        Self {
            wrap: true,
            initial: None,
            arrow_down_opens: false,
            requires_entries: true,
            tab: TabPolicy::CommitHighlightedOrFirst,
            enter: EnterPolicy::CommitHighlighted,
            advance_focus_on_tab: true,
            advance_focus_on_enter: false,
        }
    }

    /// Search box on the server-rendered search page.
    pub fn legacy_search() -> Self {
        Self {
            wrap: true,
            initial: None,
            arrow_down_opens: false,
            requires_entries: true,
            tab: TabPolicy::PassThrough,
            enter: EnterPolicy::CommitThenSubmit,
            advance_focus_on_tab: false,
            advance_focus_on_enter: false,
        }
    }

    /// Global search bar with sectioned results.
    pub fn search_bar() -> Self {
        Self {
            wrap: false,
            initial: None,
            arrow_down_opens: false,
            requires_entries: false,
            tab: TabPolicy::CommitHighlighted,
            enter: EnterPolicy::CommitOrSubmit,
            advance_focus_on_tab: false,
            advance_focus_on_enter: false,
        }
    }
}

/// What the caller should do after a key press.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not handled; the browser default applies.
    PassThrough,
    /// Handled, nothing changes.
    Ignored,
    /// Populate and show the list, then call [`Navigator::open`].
    Open,
    /// The cursor moved to this entry.
    Moved(usize),
    /// Use this entry. The list has been closed.
    Commit {
        index: usize,
        advance_focus: bool,
        submit: bool,
    },
    /// Submit the typed text as-is. The list has been closed.
    Submit,
    /// The list was dismissed.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    config: NavigatorConfig,
    open: bool,
    len: usize,
    highlighted: Option<usize>,
}

impl Navigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            config,
            open: false,
            len: 0,
            highlighted: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Show the list with `len` entries and reset the cursor.
    pub fn open(&mut self, len: usize) {
        self.open = true;
        self.set_len(len);
    }

    /// The visible entries changed (the user typed). Resets the cursor.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.highlighted = self.config.initial.filter(|&i| i < len);
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Mouse hover highlights an entry.
    pub fn hover(&mut self, index: usize) {
        if self.open && index < self.len {
            self.highlighted = Some(index);
        }
    }

    /// Mouse click commits an entry without moving focus.
    pub fn click(&mut self, index: usize) -> Outcome {
        if !self.open || index >= self.len {
            return Outcome::Ignored;
        }
        self.commit(index, false, false)
    }

    pub fn key(&mut self, key: Key) -> Outcome {
        if !self.open {
            if key == Key::ArrowDown && self.config.arrow_down_opens {
                return Outcome::Open;
            }
            return Outcome::PassThrough;
        }
        if self.len == 0 && self.config.requires_entries {
            return Outcome::PassThrough;
        }

        match key {
            Key::ArrowDown => self.step(true),
            Key::ArrowUp => self.step(false),
            Key::Tab => self.tab(),
            Key::Enter => self.enter(),
            Key::Escape => {
                self.close();
                Outcome::Dismissed
            }
        }
    }

    fn step(&mut self, down: bool) -> Outcome {
        if self.len == 0 {
            self.highlighted = None;
            return Outcome::Ignored;
        }

        let last = self.len - 1;
        let next = match (self.highlighted.map(|i| i.min(last)), down) {
            (None, true) => 0,
            (None, false) if self.config.wrap => last,
            (None, false) => 0,
            (Some(i), true) if i == last => {
                if self.config.wrap {
                    0
                } else {
                    last
                }
            }
            (Some(i), true) => i + 1,
            (Some(0), false) => {
                if self.config.wrap {
                    last
                } else {
                    0
                }
            }
            (Some(i), false) => i - 1,
        };

        self.highlighted = Some(next);
        Outcome::Moved(next)
    }

    fn tab(&mut self) -> Outcome {
        let advance = self.config.advance_focus_on_tab;
        match (self.config.tab, self.highlighted) {
            (TabPolicy::PassThrough, _) => Outcome::PassThrough,
            (TabPolicy::CommitHighlighted, Some(i)) => self.commit(i, advance, false),
            (TabPolicy::CommitHighlighted, None) => Outcome::Ignored,
            (TabPolicy::CommitHighlightedOrFirst, selected) => {
                self.commit(selected.unwrap_or(0), advance, false)
            }
        }
    }

    fn enter(&mut self) -> Outcome {
        let advance = self.config.advance_focus_on_enter;
        match (self.config.enter, self.highlighted) {
            (EnterPolicy::CommitThenSubmit, Some(i)) => self.commit(i, advance, true),
            (_, Some(i)) => self.commit(i, advance, false),
            (EnterPolicy::CommitHighlighted, None) => Outcome::Ignored,
            (EnterPolicy::CommitOrSubmit | EnterPolicy::CommitThenSubmit, None) => {
                self.close();
                Outcome::Submit
            }
        }
    }

    fn commit(&mut self, index: usize, advance_focus: bool, submit: bool) -> Outcome {
        if index >= self.len {
            return Outcome::Ignored;
        }
        self.close();
        Outcome::Commit {
            index,
            advance_focus,
            submit,
        }
    }
}
