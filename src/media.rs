use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Listings carry at most this many images; the cap is enforced here and at
/// the create endpoint.
pub const MAX_LISTING_IMAGES: usize = 5;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

pub async fn upload_listing_images(
    st: &AppState,
    user_id: Uuid,
    images: Vec<UploadItem>,
) -> ApiResult<Vec<String>> {
    if images.len() > MAX_LISTING_IMAGES {
        return Err(ApiError::validation(format!(
            "at most {} images per listing",
            MAX_LISTING_IMAGES
        )));
    }

    let mut urls = Vec::with_capacity(images.len());
    for img in images {
        let id = Uuid::new_v4();
        let ext = ext_from_mime(&img.content_type).unwrap_or("bin");
        let key = format!("listings/{}/{}.{}", user_id, id, ext);
        st.storage
            .put_object(&key, img.body, &img.content_type)
            .await
            .with_context(|| format!("put_object {}", key))?;
        urls.push(st.storage.public_url(&key));
    }
    Ok(urls)
}

pub async fn upload_avatar(
    st: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> ApiResult<String> {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    let key = format!("avatars/{}/{}.{}", user_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Ok(st.storage.public_url(&key))
}

/// Delete a stored object by its public URL. URLs pointing outside our
/// bucket are ignored.
pub async fn delete_by_url(st: &AppState, url: &str) -> ApiResult<()> {
    if let Some(key) = st.storage.key_for_url(url) {
        st.storage
            .delete_object(&key)
            .await
            .with_context(|| format!("delete_object {}", key))?;
    }
    Ok(())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
