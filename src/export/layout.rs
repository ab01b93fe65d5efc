//! Page layout for the planner snapshot.
//!
//! Layout walks the planner top to bottom with a single vertical cursor and
//! places text and rules on fixed-size pages. Coordinates are millimetres
//! measured from the top-left corner; `y` is the text baseline. Every block is
//! measured before it is placed so a page break never lands inside it, and a
//! block taller than a whole page is continued line by line.

use crate::export::metrics::wrap_text;
use crate::fields::Weekday;
use crate::planner::PlannerState;

/// Physical page size and the fixed spacing used by the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub line_height: f32,
}

impl PageGeometry {
    /// A4 portrait with 15 mm margins.
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 15.0,
        line_height: 5.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - self.margin * 2.0
    }

    /// Lowest baseline allowed on a page.
    pub fn printable_bottom(&self) -> f32 {
        self.height - self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub color: (u8, u8, u8),
}

const BLACK: (u8, u8, u8) = (0, 0, 0);
const ACCENT: (u8, u8, u8) = (0x8F, 0x1F, 0x57);

pub const TITLE: TextStyle = TextStyle { size: 22.0, weight: FontWeight::Bold, color: ACCENT };
pub const SECTION: TextStyle = TextStyle { size: 16.0, weight: FontWeight::Bold, color: BLACK };
pub const HEADING: TextStyle = TextStyle { size: 12.0, weight: FontWeight::Bold, color: BLACK };
pub const LABEL: TextStyle = TextStyle { size: 11.0, weight: FontWeight::Bold, color: BLACK };
pub const BODY: TextStyle = TextStyle { size: 11.0, weight: FontWeight::Regular, color: BLACK };

pub const DOCUMENT_TITLE: &str = "Ops Weekly Planner";
pub const NO_CONTENT: &str = "No content entered.";
pub const NO_TASKS: &str = "No tasks for this day.";
pub const NOT_DESCRIBED: &str = "Not described.";
pub const NOT_PROVIDED: &str = "Not provided.";

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text { x: f32, y: f32, text: String, style: TextStyle },
    Rule { x1: f32, x2: f32, y: f32 },
}

impl Element {
    pub fn y(&self) -> f32 {
        match self {
            Element::Text { y, .. } | Element::Rule { y, .. } => *y,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl Document {
    /// All text on all pages, in emission order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| &p.elements).filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Rule { .. } => None,
        })
    }
}

fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}

/// Cursor-driven page writer.
struct Layout {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl Layout {
    fn new(geometry: PageGeometry) -> Self {
        Layout {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin,
        }
    }

    fn margin(&self) -> f32 {
        self.geometry.margin
    }

    fn line_height(&self) -> f32 {
        self.geometry.line_height
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin;
    }

    /// Start a new page unless `needed` millimetres fit below the cursor.
    fn ensure(&mut self, needed: f32) {
        if self.y + needed > self.geometry.printable_bottom() {
            self.new_page();
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn text(&mut self, x: f32, text: impl Into<String>, style: TextStyle) {
        let y = self.y;
        self.push(Element::Text { x, y, text: text.into(), style });
    }

    /// Emit a run of lines as one block, reserving `pad` extra space below it.
    ///
    /// The cursor advances by the height of the lines only.
    fn block(&mut self, lines: Vec<(f32, String)>, style: TextStyle, pad: f32) {
        let lh = self.line_height();
        let height = lines.len() as f32 * lh;
        let usable = self.geometry.printable_bottom() - self.margin();

        if height + pad <= usable {
            self.ensure(height + pad);
            let top = self.y;
            for (i, (x, line)) in lines.into_iter().enumerate() {
                self.push(Element::Text { x, y: top + i as f32 * lh, text: line, style });
            }
            self.y += height;
        } else {
            for (x, line) in lines {
                self.ensure(lh);
                self.text(x, line, style);
                self.y += lh;
            }
        }
    }

    /// Horizontal rule across the content width, drawn just above the cursor.
    fn rule(&mut self) {
        if self.y - 4.0 > self.geometry.printable_bottom() {
            self.new_page();
            self.y += 4.0;
        }
        let y = self.y - 4.0;
        let x1 = self.margin();
        let x2 = self.margin() + self.geometry.content_width();
        self.push(Element::Rule { x1, x2, y });
        self.y += 5.0;
    }

    fn section_heading(&mut self, title: &str) {
        self.ensure(20.0);
        let x = self.margin();
        self.text(x, title, SECTION);
        self.y += 8.0;
    }

    /// Checkbox item: the first line carries the box, the rest hang under the text.
    fn checkbox_item(&mut self, x: f32, hang: f32, done: bool, text: &str, wrap_width: f32, pad: f32) {
        let mut lines = wrap_text(text, wrap_width, BODY.size).into_iter();
        let first = lines.next().unwrap_or_default();
        let mut block = vec![(x, format!("{} {}", checkbox(done), first))];
        block.extend(lines.map(|l| (x + hang, l)));
        self.block(block, BODY, pad);
    }

    fn free_text_section(&mut self, title: &str, body: &str) {
        self.section_heading(title);
        let x = self.margin();
        let width = self.geometry.content_width();
        let lines = wrap_text(or_placeholder(body, NO_CONTENT), width, BODY.size)
            .into_iter()
            .map(|l| (x, l))
            .collect();
        self.block(lines, BODY, 8.0);
        self.y += 8.0;
    }

    fn daily_checkin(&mut self, state: &PlannerState) {
        self.section_heading("Daily Check-in");
        let m = self.margin();
        let width = self.geometry.content_width();

        for day in Weekday::ALL {
            self.ensure(10.0);
            self.text(m, format!("{} {}", day, checkbox(state.daily_checkins.get(day))), HEADING);
            self.y += 6.0;

            let tasks = state.weekly_tasks.day(day);
            if tasks.is_empty() {
                self.block(vec![(m + 5.0, NO_TASKS.to_string())], BODY, 0.0);
            }
            for task in tasks {
                self.checkbox_item(m + 5.0, 6.0, task.completed, &task.text, width - 11.0, 2.0);
            }
            self.y += 4.0;
        }
    }

    fn problem_solving(&mut self, state: &PlannerState) {
        self.section_heading("Problem Solving");
        let m = self.margin();
        let width = self.geometry.content_width();

        for (n, block) in state.problem_blocks.iter().enumerate() {
            self.ensure(35.0);
            self.text(m, format!("Problem / Issue #{}", n + 1), HEADING);
            self.y += 6.0;

            let problem = wrap_text(or_placeholder(&block.problem_text, NOT_DESCRIBED), width - 5.0, BODY.size)
                .into_iter()
                .map(|l| (m + 5.0, l))
                .collect();
            self.block(problem, BODY, 0.0);
            self.y += 3.0;

            self.ensure(self.line_height());
            self.text(m + 5.0, "Solutions:", LABEL);
            self.y += self.line_height();

            for (i, solution) in block.solutions.iter().enumerate() {
                let text = format!("{}. {}", i + 1, or_placeholder(solution, NOT_PROVIDED));
                let lines = wrap_text(&text, width - 10.0, BODY.size)
                    .into_iter()
                    .map(|l| (m + 10.0, l))
                    .collect();
                self.block(lines, BODY, 0.0);
            }
            self.y += 5.0;
        }
    }

    fn communication(&mut self, state: &PlannerState) {
        self.section_heading("Communication");
        let m = self.margin();
        let width = self.geometry.content_width();

        for task in &state.communication_tasks {
            self.checkbox_item(m, 5.0, task.completed, &task.text, width - 6.0, 0.0);
        }
        self.y += 5.0;

        self.ensure(6.0);
        self.text(m, "Additional Notes:", HEADING);
        self.y += 6.0;

        for note in state.additional_notes.iter().filter(|n| !n.text.trim().is_empty()) {
            let lines = wrap_text(&format!("- {}", note.text), width - 5.0, BODY.size)
                .into_iter()
                .map(|l| (m + 5.0, l))
                .collect();
            self.block(lines, BODY, 0.0);
        }
    }

    fn finish(self) -> Document {
        Document {
            geometry: self.geometry,
            pages: self.pages,
        }
    }
}

/// Lay out the whole planner onto pages of the given geometry.
pub fn layout(state: &PlannerState, geometry: PageGeometry) -> Document {
    let mut out = Layout::new(geometry);

    let m = out.margin();
    out.text(m, DOCUMENT_TITLE, TITLE);
    out.y += 15.0;

    out.free_text_section("Weekly Priorities", &state.weekly_priorities);
    out.free_text_section("Weekly Notes", &state.weekly_notes);

    out.rule();
    out.daily_checkin(state);

    out.rule();
    out.problem_solving(state);

    out.rule();
    out.communication(state);

    out.finish()
}
