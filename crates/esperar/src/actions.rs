//! Action-chain composition for input simulation.
//!
//! Features:
//! - Mouse hover, drag and drop, context clicks, double clicks
//! - Keyboard chords (e.g. Ctrl+A) and text entry
//! - Fluent chaining with explicit, labeled settle pauses
//!
//! Every action that addresses an entity waits for it to be ready before
//! dispatch (clickable for clicks, visible otherwise), so a chain never
//! races the page. Fixed pacing delays are never implicit: a chain only
//! pauses where [`ActionChain::settle`] was spelled out.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::conditions;
use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::EsperarResult;
use crate::wait::{settle, Waiter};

/// Keyboard keys usable in chords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Control modifier
    Control,
    /// Shift modifier
    Shift,
    /// Alt modifier
    Alt,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Tab key
    Tab,
    /// A literal character
    Char(char),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Control => write!(f, "Control"),
            Self::Shift => write!(f, "Shift"),
            Self::Alt => write!(f, "Alt"),
            Self::Enter => write!(f, "Enter"),
            Self::Escape => write!(f, "Escape"),
            Self::Tab => write!(f, "Tab"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

/// A single input action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Click the entity
    Click {
        /// Target entity
        locator: Locator,
    },
    /// Double-click the entity
    DoubleClick {
        /// Target entity
        locator: Locator,
    },
    /// Right-click (context menu) on the entity
    ContextClick {
        /// Target entity
        locator: Locator,
    },
    /// Move the pointer over the entity
    Hover {
        /// Target entity
        locator: Locator,
    },
    /// Press and hold the primary button on the entity
    ClickAndHold {
        /// Target entity
        locator: Locator,
    },
    /// Release a held button
    Release,
    /// Drag one entity onto another
    DragAndDrop {
        /// Entity to drag
        source: Locator,
        /// Entity to drop onto
        target: Locator,
    },
    /// Drag an entity by a pixel offset
    DragByOffset {
        /// Entity to drag
        locator: Locator,
        /// Horizontal offset in pixels
        x_offset: i32,
        /// Vertical offset in pixels
        y_offset: i32,
    },
    /// Move the pointer by a pixel offset
    MoveByOffset {
        /// Horizontal offset in pixels
        x_offset: i32,
        /// Vertical offset in pixels
        y_offset: i32,
    },
    /// Click the entity and type text into it
    TypeText {
        /// Target entity
        locator: Locator,
        /// Text to type
        text: String,
    },
    /// Select-all then replace the entity's text
    ClearAndType {
        /// Target entity
        locator: Locator,
        /// Replacement text
        text: String,
    },
    /// Press a key chord (first key held while the rest are typed)
    KeyChord {
        /// Keys in press order
        keys: Vec<Key>,
    },
    /// Scroll the entity into view
    ScrollTo {
        /// Target entity
        locator: Locator,
    },
}

impl Action {
    /// Entities this action addresses, used for readiness waits
    fn locators(&self) -> Vec<&Locator> {
        match self {
            Self::Click { locator }
            | Self::DoubleClick { locator }
            | Self::ContextClick { locator }
            | Self::Hover { locator }
            | Self::ClickAndHold { locator }
            | Self::DragByOffset { locator, .. }
            | Self::TypeText { locator, .. }
            | Self::ClearAndType { locator, .. }
            | Self::ScrollTo { locator } => vec![locator],
            Self::DragAndDrop { source, target } => vec![source, target],
            Self::Release | Self::MoveByOffset { .. } | Self::KeyChord { .. } => Vec::new(),
        }
    }

    /// Clicks need the stronger clickability check before dispatch
    fn needs_clickable(&self) -> bool {
        matches!(self, Self::Click { .. } | Self::DoubleClick { .. })
    }
}

/// One step of a chain: either an action or an explicit settle pause
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Act(Action),
    Settle {
        duration: Duration,
        label: String,
    },
}

/// Fluent builder for a sequence of input actions.
///
/// Usage:
///
/// ```
/// use std::time::Duration;
/// use esperar::{ActionChain, Key, Locator};
///
/// let chain = ActionChain::new()
///     .clear_and_type(Locator::id("src"), "Mumbai")
///     .settle(Duration::from_millis(200), "suggestion dropdown")
///     .click(Locator::xpath("//text[contains(text(),'Mumbai')]"))
///     .key_chord(vec![Key::Control, Key::Char('a')]);
/// assert_eq!(chain.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActionChain {
    steps: Vec<Step>,
}

impl ActionChain {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps queued
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the chain has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(mut self, action: Action) -> Self {
        self.steps.push(Step::Act(action));
        self
    }

    /// Click an entity
    #[must_use]
    pub fn click(self, locator: Locator) -> Self {
        self.push(Action::Click { locator })
    }

    /// Double-click an entity
    #[must_use]
    pub fn double_click(self, locator: Locator) -> Self {
        self.push(Action::DoubleClick { locator })
    }

    /// Right-click an entity
    #[must_use]
    pub fn context_click(self, locator: Locator) -> Self {
        self.push(Action::ContextClick { locator })
    }

    /// Hover over an entity
    #[must_use]
    pub fn hover(self, locator: Locator) -> Self {
        self.push(Action::Hover { locator })
    }

    /// Press and hold on an entity
    #[must_use]
    pub fn click_and_hold(self, locator: Locator) -> Self {
        self.push(Action::ClickAndHold { locator })
    }

    /// Release a held button
    #[must_use]
    pub fn release(self) -> Self {
        self.push(Action::Release)
    }

    /// Drag one entity onto another
    #[must_use]
    pub fn drag_and_drop(self, source: Locator, target: Locator) -> Self {
        self.push(Action::DragAndDrop { source, target })
    }

    /// Drag an entity by a pixel offset
    #[must_use]
    pub fn drag_by_offset(self, locator: Locator, x_offset: i32, y_offset: i32) -> Self {
        self.push(Action::DragByOffset {
            locator,
            x_offset,
            y_offset,
        })
    }

    /// Move the pointer by a pixel offset
    #[must_use]
    pub fn move_by_offset(self, x_offset: i32, y_offset: i32) -> Self {
        self.push(Action::MoveByOffset { x_offset, y_offset })
    }

    /// Click an entity and type text into it
    #[must_use]
    pub fn type_text(self, locator: Locator, text: impl Into<String>) -> Self {
        self.push(Action::TypeText {
            locator,
            text: text.into(),
        })
    }

    /// Select-all then replace an entity's text
    #[must_use]
    pub fn clear_and_type(self, locator: Locator, text: impl Into<String>) -> Self {
        self.push(Action::ClearAndType {
            locator,
            text: text.into(),
        })
    }

    /// Press a key chord, e.g. `[Key::Control, Key::Char('a')]`
    #[must_use]
    pub fn key_chord(self, keys: Vec<Key>) -> Self {
        self.push(Action::KeyChord { keys })
    }

    /// Scroll an entity into view
    #[must_use]
    pub fn scroll_to(self, locator: Locator) -> Self {
        self.push(Action::ScrollTo { locator })
    }

    /// Insert an explicit, labeled fixed delay. Last resort for UI effects
    /// with no observable condition; the label appears in debug logs.
    #[must_use]
    pub fn settle(mut self, duration: Duration, label: impl Into<String>) -> Self {
        self.steps.push(Step::Settle {
            duration,
            label: label.into(),
        });
        self
    }

    /// Dispatch the chain against a page.
    ///
    /// Each addressed entity is waited on (with `waiter`'s configuration)
    /// before its action is sent; a failed readiness wait aborts the chain.
    pub fn perform<D: PageDriver>(&self, page: &mut D, waiter: &Waiter) -> EsperarResult<()> {
        for step in &self.steps {
            match step {
                Step::Act(action) => {
                    for locator in action.locators() {
                        if action.needs_clickable() {
                            waiter.until(&*page, &conditions::clickable(locator.clone()))?;
                        } else {
                            waiter.until(&*page, &conditions::visibility(locator.clone()))?;
                        }
                    }
                    page.perform(action)?;
                }
                Step::Settle { duration, label } => settle(*duration, label),
            }
        }
        Ok(())
    }
}
