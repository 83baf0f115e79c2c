use std::fmt::Display;

use super::Response;
use crate::controllers::PostActions;
use crate::entities::{Post, UserProfile};
use crate::guard::MenuItem;
use crate::optimistic::LikeView;

pub(crate) fn likes_label(count: usize) -> String {
    match count {
        1 => "1 Like".to_string(),
        n => format!("{} Likes", n),
    }
}

pub(crate) fn resp_from_user(
    title: impl Display,
    description: impl Display,
    rgb: (u8, u8, u8),
    UserProfile {
        id,
        username,
        full_name,
        email,
    }: &UserProfile,
) -> Response {
    Response {
        title: format!("{}", title),
        rgb,
        description: format!("{}", description),
        fields: vec![
            ("id:".to_string(), id.to_string()),
            ("username:".to_string(), username.clone()),
            ("name:".to_string(), full_name.clone()),
            ("email:".to_string(), email.clone()),
        ],
    }
}

pub(crate) fn resp_from_post(
    title: impl Display,
    description: impl Display,
    rgb: (u8, u8, u8),
    post: &Post,
    like: Option<LikeView>,
    actions: PostActions,
) -> Response {
    let (liked, count, pending) = match like {
        Some(v) => (v.is_liked(), v.count, v.state.is_pending()),
        None => (false, post.like_count(), false),
    };

    let mut likes = likes_label(count);
    if liked {
        likes.push_str(" (liked)");
    }
    if pending {
        likes.push_str(" (pending)");
    }

    let mut fields = vec![
        ("id:".to_string(), post.id.to_string()),
        ("title:".to_string(), post.title.clone()),
        ("author:".to_string(), post.author.display_name().to_string()),
        ("content:".to_string(), post.content.clone()),
        ("likes:".to_string(), likes),
    ];

    if let Some(url) = post.image() {
        fields.push(("image:".to_string(), url.to_string()));
    }
    if let Some(at) = post.created_at {
        fields.push(("posted:".to_string(), at.format("%Y-%m-%d %H:%M").to_string()));
    }

    let offered = [
        (actions.can_like, "like"),
        (actions.can_edit, "edit"),
        (actions.can_delete, "delete"),
    ]
    .iter()
    .filter(|(ok, _)| *ok)
    .map(|(_, name)| *name)
    .collect::<Vec<_>>();
    if !offered.is_empty() {
        fields.push(("actions:".to_string(), offered.join(", ")));
    }

    Response {
        title: format!("{}", title),
        rgb,
        description: format!("{}", description),
        fields,
    }
}

pub(crate) fn menu_line(menu: &[MenuItem]) -> String {
    menu.iter()
        .map(|m| match m {
            MenuItem::Home => "Home (posts)",
            MenuItem::CreatePost => "Create Post (create)",
            MenuItem::Logout => "Logout (logout)",
            MenuItem::Login => "Login (login)",
            MenuItem::Register => "Register (register)",
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_like_is_singular() {
        assert_eq!(likes_label(0), "0 Likes");
        assert_eq!(likes_label(1), "1 Like");
        assert_eq!(likes_label(3), "3 Likes");
    }
}
