#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddWord,
    DeleteWord,
    ShowWords,
    Quiz,
    Stats,
    Settings,
}

/// Main menu buttons, two per row.
pub const MENU_LABELS: [[(&str, MenuAction); 2]; 3] = [
    [
        ("➕ Add word", MenuAction::AddWord),
        ("➖ Delete word", MenuAction::DeleteWord),
    ],
    [
        ("📚 All words", MenuAction::ShowWords),
        ("📝 Quiz", MenuAction::Quiz),
    ],
    [
        ("📊 Statistics", MenuAction::Stats),
        ("⚙️ Settings", MenuAction::Settings),
    ],
];

/// Lowercased letters and digits, words separated by single spaces.
fn normalize(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn lookup(text: &str) -> Option<MenuAction> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }

    MENU_LABELS
        .iter()
        .flatten()
        .find(|(label, _)| normalize(label) == wanted)
        .map(|(_, action)| *action)
}
