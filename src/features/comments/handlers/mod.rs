pub mod comment_handler;

pub use comment_handler::{
    __path_create_comment, __path_delete_comment, __path_get_rating, __path_list_comments,
    __path_rate, __path_react_to_comment, create_comment, delete_comment, get_rating,
    list_comments, rate, react_to_comment, CommentScope,
};
