use crate::{
    callback::Token,
    config::Languages,
    database::connection::{ManagePreferences, ManageWords, TrackStats},
    error::Result,
    reply::{Choice, Reply},
};

pub(crate) fn settings_menu() -> Reply {
    let choices = [
        ("🗑 Clear words", Token::ClearWords),
        ("📉 Clear statistics", Token::ClearStats),
        ("🔄 Change quiz direction", Token::ToggleDirection),
    ]
    .into_iter()
    .map(|(label, token)| Choice {
        label: label.to_owned(),
        token,
    })
    .collect();

    Reply::with_choices("⚙️ Settings:", choices)
}

pub(crate) async fn show_stats<Tracker: TrackStats>(stats: &Tracker) -> Result<Reply> {
    let stats = stats.get_counters().await?;
    Ok(Reply::text(stats.to_string()))
}

pub(crate) async fn clear_words<Words: ManageWords>(words: &Words) -> Result<Reply> {
    let deleted = words.clear_words().await?;
    tracing::info!(deleted, "word list cleared");
    Ok(Reply::text("✅ Word list cleared."))
}

pub(crate) async fn clear_stats<Tracker: TrackStats>(stats: &Tracker) -> Result<Reply> {
    stats.reset_counters().await?;
    tracing::info!("answer statistics cleared");
    Ok(Reply::text("✅ Statistics cleared."))
}

pub(crate) async fn toggle_direction<Prefs: ManagePreferences>(
    prefs: &Prefs,
    languages: &Languages,
    user_id: i64,
) -> Result<Reply> {
    let direction = prefs.toggle_direction(user_id).await?;
    tracing::info!(user_id, ?direction, "quiz direction changed");
    Ok(Reply::text(format!(
        "✅ Quiz direction changed to {}",
        languages.direction_label(direction)
    )))
}
