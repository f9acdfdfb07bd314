mod entity;
mod error;
mod notify;
mod raw;
mod reconcile;
mod session;
mod state;
mod upload;
mod validate;

pub use entity::{Entity, EntityValue, Pair, Scalar};
pub use error::{FormatIssue, SubmitError};
pub use notify::{MemoryNotifier, Notice, Notifier, TracingNotifier};
pub use raw::{InputControl, RawInput, RawInputSet};
pub use reconcile::{
    ARTICLE_BUTTON_LINK, ARTICLE_CONTENT, ARTICLE_IMAGE_URL, ARTICLE_SUBTITLE, ARTICLE_TITLE,
    GALLERY_HANDLE, GALLERY_IMAGE_URLS, GALLERY_PROFILE_PHOTO_URL, GALLERY_TITLE, GALLERY_URL,
    reconcile,
};
pub use session::{EditForm, Navigator, SUBMIT_SUCCESS};
pub use state::{FieldState, FormState};
pub use upload::{
    MAX_UPLOAD_BYTES, StoredFile, StoredFileState, UploadFile, UploadedFileMap, Uploader,
};
pub use validate::{check_value, validate};
pub(crate) use validate::is_email_shaped;
