use domain::{BlogError, BlogResult, ContentEntity, ContentKind, ContentRef};
use storage::Db;

/// Looks up the entity named by a type tag and id.
pub async fn resolve(db: &Db, tag: &str, id: i64) -> BlogResult<ContentEntity> {
    let kind = ContentKind::from_tag(tag)?;
    resolve_ref(db, ContentRef::new(kind, id)).await
}

pub async fn resolve_ref(db: &Db, target: ContentRef) -> BlogResult<ContentEntity> {
    let found = match target.kind {
        ContentKind::Post => db.get_post(target.id).await?.map(ContentEntity::Post),
        ContentKind::Comment => db.get_comment(target.id).await?.map(ContentEntity::Comment),
    };
    found.ok_or(BlogError::NotFound {
        kind: target.kind.tag(),
        id: target.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{PostForm, ReadingSpeed};
    use storage::CommentInsert;

    #[tokio::test]
    async fn resolves_every_registered_kind() {
        let db = Db::in_memory().await.unwrap();
        let user = db.create_user("u", "h").await.unwrap().unwrap();
        let post = PostForm::new("t", "b").prepare(ReadingSpeed::default()).unwrap();
        let post = db.insert_post(user.id, &post).await.unwrap();
        let (comment, _) = db
            .insert_comment_or_get(&CommentInsert {
                author_id: user.id,
                target: post.content_ref(),
                parent_id: None,
                body: "hi",
            })
            .await
            .unwrap();

        match resolve(&db, "post", post.id).await.unwrap() {
            ContentEntity::Post(p) => assert_eq!(p.id, post.id),
            other => panic!("unexpected {:?}", other),
        }
        let entity = resolve(&db, "comment", comment.id).await.unwrap();
        assert_eq!(entity.content_ref(), ContentRef::comment(comment.id));
    }

    #[tokio::test]
    async fn unknown_tags_and_missing_rows() {
        let db = Db::in_memory().await.unwrap();

        assert!(matches!(
            resolve(&db, "gallery", 1).await,
            Err(BlogError::UnknownType(_))
        ));
        assert!(matches!(
            resolve(&db, "post", 42).await,
            Err(BlogError::NotFound { kind: "post", id: 42 })
        ));
    }
}
