use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::models::Book;

/// Wire shape of a single book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            price: book.price,
        }
    }
}

/// Body of `GET /books`. An empty store serialises as `{"books": []}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BooksResponse {
    pub books: Vec<BookResponse>,
}

impl From<Vec<Book>> for BooksResponse {
    fn from(books: Vec<Book>) -> Self {
        Self {
            books: books.into_iter().map(BookResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_serialises_as_empty_array() {
        let body = serde_json::to_value(BooksResponse::from(Vec::new())).unwrap();
        assert_eq!(body, serde_json::json!({"books": []}));
    }

    #[test]
    fn book_fields_map_one_to_one() {
        let book = Book {
            id: 7,
            title: "Programming Rust".to_string(),
            author: "Jim Blandy".to_string(),
            publisher: "O'Reilly".to_string(),
            price: 55,
        };

        let body = serde_json::to_value(BookResponse::from(book)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "id": 7,
                "title": "Programming Rust",
                "author": "Jim Blandy",
                "publisher": "O'Reilly",
                "price": 55
            })
        );
    }
}
