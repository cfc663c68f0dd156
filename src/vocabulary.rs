use crate::{
    callback::Token,
    database::connection::ManageWords,
    error::Result,
    reply::{Choice, Reply},
};

const EMPTY: &str = "Your word list is empty.";

/// Word buttons per page of the delete picker.
pub(crate) const DELETE_PAGE_SIZE: usize = 20;

pub(crate) async fn show_words<Words: ManageWords>(words: &Words) -> Result<Reply> {
    let words = words.list_words().await?;
    if words.is_empty() {
        return Ok(Reply::text(EMPTY));
    }

    let lines: Vec<String> = words.iter().map(ToString::to_string).collect();
    Ok(Reply::text(format!("📚 Your dictionary:\n\n{}", lines.join("\n"))))
}

/// Offers one page of stored words as buttons carrying their ids.
/// A page past the end shows the last page.
pub(crate) async fn start_deleting<Words: ManageWords>(words: &Words, page: usize) -> Result<Reply> {
    let words = words.list_words().await?;
    if words.is_empty() {
        return Ok(Reply::text(EMPTY));
    }

    let pages = words.len().div_ceil(DELETE_PAGE_SIZE);
    let page = page.min(pages - 1);

    let mut choices: Vec<Choice> = words
        .iter()
        .skip(page * DELETE_PAGE_SIZE)
        .take(DELETE_PAGE_SIZE)
        .map(|word| Choice {
            label: word.to_string(),
            token: Token::Delete(word.id()),
        })
        .collect();

    if pages == 1 {
        return Ok(Reply::with_choices("Choose a word to delete:", choices));
    }

    if page > 0 {
        choices.push(Choice {
            label: "◀️ Previous".to_owned(),
            token: Token::DeletePage(page - 1),
        });
    }
    if page + 1 < pages {
        choices.push(Choice {
            label: "Next ▶️".to_owned(),
            token: Token::DeletePage(page + 1),
        });
    }

    Ok(Reply::with_choices(
        format!("Choose a word to delete (page {} of {pages}):", page + 1),
        choices,
    ))
}

pub(crate) async fn delete<Words: ManageWords>(words: &Words, id: i64) -> Result<Reply> {
    if words.delete_word(id).await? {
        tracing::info!(id, "word deleted");
        Ok(Reply::text("✅ Word deleted."))
    } else {
        tracing::warn!(id, "delete requested for a word that no longer exists");
        Ok(Reply::text("That word was already removed."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::connection::tests::connection, reply::Markup};

    #[tokio::test]
    async fn empty_list_is_reported() {
        let db = connection().await;
        assert_eq!(show_words(&db).await.unwrap(), Reply::text(EMPTY));
        assert_eq!(start_deleting(&db, 0).await.unwrap(), Reply::text(EMPTY));
    }

    #[tokio::test]
    async fn words_are_listed_one_per_line() {
        let db = connection().await;
        db.add_word("cat", "кіт").await.unwrap();
        db.add_word("dog", "пес").await.unwrap();

        let reply = show_words(&db).await.unwrap();
        assert_eq!(reply.text, "📚 Your dictionary:\n\ncat → кіт\ndog → пес");
    }

    #[tokio::test]
    async fn delete_offers_a_button_per_word() {
        let db = connection().await;
        let cat = db.add_word("cat", "кіт").await.unwrap();
        let dog = db.add_word("dog", "пес").await.unwrap();

        let reply = start_deleting(&db, 0).await.unwrap();
        let Some(Markup::Choices(choices)) = reply.markup else {
            panic!("expected word buttons");
        };
        let tokens: Vec<Token> = choices.iter().map(|choice| choice.token).collect();
        assert_eq!(tokens, vec![Token::Delete(cat), Token::Delete(dog)]);
        assert_eq!(choices[0].label, "cat → кіт");
    }

    fn tokens(reply: &Reply) -> Vec<Token> {
        match &reply.markup {
            Some(Markup::Choices(choices)) => choices.iter().map(|choice| choice.token).collect(),
            other => panic!("expected buttons, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn large_dictionary_is_paged() {
        let db = connection().await;
        for i in 0..45 {
            db.add_word(&format!("word{i}"), &format!("слово{i}")).await.unwrap();
        }

        let first = start_deleting(&db, 0).await.unwrap();
        let buttons = tokens(&first);
        assert_eq!(buttons.len(), DELETE_PAGE_SIZE + 1);
        assert_eq!(buttons.last(), Some(&Token::DeletePage(1)));
        assert_eq!(first.text, "Choose a word to delete (page 1 of 3):");

        let middle = tokens(&start_deleting(&db, 1).await.unwrap());
        assert_eq!(middle.len(), DELETE_PAGE_SIZE + 2);
        assert!(middle.contains(&Token::DeletePage(0)));
        assert!(middle.contains(&Token::DeletePage(2)));

        let last = start_deleting(&db, 2).await.unwrap();
        let buttons = tokens(&last);
        assert_eq!(buttons.len(), 5 + 1);
        assert_eq!(buttons.last(), Some(&Token::DeletePage(1)));

        // the list shrank under an old "next" button
        assert_eq!(start_deleting(&db, 9).await.unwrap(), last);
    }

    #[tokio::test]
    async fn stale_delete_is_reported_distinctly() {
        let db = connection().await;
        let id = db.add_word("cat", "кіт").await.unwrap();

        assert_eq!(delete(&db, id).await.unwrap().text, "✅ Word deleted.");
        assert_eq!(
            delete(&db, id).await.unwrap().text,
            "That word was already removed."
        );
        assert!(db.list_words().await.unwrap().is_empty());
    }
}
