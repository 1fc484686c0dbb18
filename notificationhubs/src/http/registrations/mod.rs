use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::format::{NotificationFormat, TargetPlatform};
use crate::http::error::{MultiError, ValidationError};
use crate::http::xml::DecodeError;

pub mod create;
pub mod decode;
pub mod delete;
pub mod get;
pub mod list;
pub mod payload;

/// Content type of registration entries sent to the hub.
pub(crate) const ATOM_ENTRY_CONTENT_TYPE: &str = "application/atom+xml;type=entry;charset=utf-8";

const MAX_TAG_LENGTH: usize = 120;

/// The platform specific descriptions a registration entry can carry.
///
/// [`DescriptionKind::ALL`] lists them in precedence order: when an entry carries more than one,
/// the earliest wins. Families come in the order Apple, FCM v1, Baidu, Windows, Windows Phone,
/// Kindle, and a template comes before the plain description of its family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DescriptionKind {
    AppleTemplate,
    Apple,
    FcmV1Template,
    FcmV1,
    BaiduTemplate,
    Baidu,
    WindowsTemplate,
    Windows,
    MpnsTemplate,
    Mpns,
    AdmTemplate,
    Adm,
}

impl DescriptionKind {
    pub const ALL: [DescriptionKind; 12] = [
        DescriptionKind::AppleTemplate,
        DescriptionKind::Apple,
        DescriptionKind::FcmV1Template,
        DescriptionKind::FcmV1,
        DescriptionKind::BaiduTemplate,
        DescriptionKind::Baidu,
        DescriptionKind::WindowsTemplate,
        DescriptionKind::Windows,
        DescriptionKind::MpnsTemplate,
        DescriptionKind::Mpns,
        DescriptionKind::AdmTemplate,
        DescriptionKind::Adm,
    ];

    /// Name of the XML element holding the description.
    pub fn element_name(&self) -> &'static str {
        match self {
            DescriptionKind::AppleTemplate => "AppleTemplateRegistrationDescription",
            DescriptionKind::Apple => "AppleRegistrationDescription",
            DescriptionKind::FcmV1Template => "FcmV1TemplateRegistrationDescription",
            DescriptionKind::FcmV1 => "FcmV1RegistrationDescription",
            DescriptionKind::BaiduTemplate => "BaiduTemplateRegistrationDescription",
            DescriptionKind::Baidu => "BaiduRegistrationDescription",
            DescriptionKind::WindowsTemplate => "WindowsTemplateRegistrationDescription",
            DescriptionKind::Windows => "WindowsRegistrationDescription",
            DescriptionKind::MpnsTemplate => "MpnsTemplateRegistrationDescription",
            DescriptionKind::Mpns => "MpnsRegistrationDescription",
            DescriptionKind::AdmTemplate => "AdmTemplateRegistrationDescription",
            DescriptionKind::Adm => "AdmRegistrationDescription",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.element_name() == name)
    }

    /// Name of the element carrying the platform's device handle.
    pub fn device_handle_element(&self) -> &'static str {
        match self {
            DescriptionKind::AppleTemplate | DescriptionKind::Apple => "DeviceToken",
            DescriptionKind::FcmV1Template | DescriptionKind::FcmV1 => "FcmV1RegistrationId",
            DescriptionKind::BaiduTemplate | DescriptionKind::Baidu => "BaiduChannelId",
            DescriptionKind::WindowsTemplate
            | DescriptionKind::Windows
            | DescriptionKind::MpnsTemplate
            | DescriptionKind::Mpns => "ChannelUri",
            DescriptionKind::AdmTemplate | DescriptionKind::Adm => "AdmRegistrationId",
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(
            self,
            DescriptionKind::AppleTemplate
                | DescriptionKind::FcmV1Template
                | DescriptionKind::BaiduTemplate
                | DescriptionKind::WindowsTemplate
                | DescriptionKind::MpnsTemplate
                | DescriptionKind::AdmTemplate
        )
    }

    pub fn target(&self) -> TargetPlatform {
        match self {
            DescriptionKind::AppleTemplate => TargetPlatform::AppleTemplate,
            DescriptionKind::Apple => TargetPlatform::Apple,
            DescriptionKind::FcmV1Template => TargetPlatform::FcmV1Template,
            DescriptionKind::FcmV1 => TargetPlatform::FcmV1,
            DescriptionKind::BaiduTemplate => TargetPlatform::BaiduTemplate,
            DescriptionKind::Baidu => TargetPlatform::Baidu,
            DescriptionKind::WindowsTemplate => TargetPlatform::WindowsTemplate,
            DescriptionKind::Windows => TargetPlatform::Windows,
            DescriptionKind::MpnsTemplate => TargetPlatform::WindowsPhoneTemplate,
            DescriptionKind::Mpns => TargetPlatform::WindowsPhone,
            DescriptionKind::AdmTemplate => TargetPlatform::AdmTemplate,
            DescriptionKind::Adm => TargetPlatform::Adm,
        }
    }

    pub fn format(&self) -> NotificationFormat {
        self.target().format()
    }

    /// Kind used to register a device for notifications in `format`.
    ///
    /// Baidu needs both a user and a channel id, so it can not be registered from a single device id.
    pub fn for_format(format: NotificationFormat) -> Option<Self> {
        match format {
            NotificationFormat::Apple => Some(DescriptionKind::Apple),
            NotificationFormat::FcmV1 => Some(DescriptionKind::FcmV1),
            NotificationFormat::Windows => Some(DescriptionKind::Windows),
            NotificationFormat::WindowsPhone => Some(DescriptionKind::Mpns),
            NotificationFormat::Kindle => Some(DescriptionKind::Adm),
            NotificationFormat::Baidu | NotificationFormat::Template => None,
        }
    }

    /// Template kind used to register a device of `platform`.
    pub fn for_template_platform(platform: TargetPlatform) -> Option<Self> {
        match platform {
            TargetPlatform::Apple | TargetPlatform::AppleTemplate => Some(DescriptionKind::AppleTemplate),
            TargetPlatform::FcmV1 | TargetPlatform::FcmV1Template => Some(DescriptionKind::FcmV1Template),
            TargetPlatform::Windows | TargetPlatform::WindowsTemplate => Some(DescriptionKind::WindowsTemplate),
            TargetPlatform::WindowsPhone | TargetPlatform::WindowsPhoneTemplate => Some(DescriptionKind::MpnsTemplate),
            TargetPlatform::Adm | TargetPlatform::AdmTemplate => Some(DescriptionKind::AdmTemplate),
            TargetPlatform::Baidu | TargetPlatform::BaiduTemplate | TargetPlatform::Template => None,
        }
    }
}

/// A platform description as it was read from the wire, before normalization.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RawDescription {
    pub kind: DescriptionKind,
    /// Device token, registration id or channel, depending on the platform.
    pub device_handle: Option<String>,
    pub registration_id: Option<String>,
    pub etag: Option<String>,
    pub expiration_time: Option<String>,
    /// Comma separated tags.
    pub tags: Option<String>,
    pub body_template: Option<String>,
}

/// A device registration in its platform independent form.
#[derive(Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDevice {
    pub device_id: String,
    pub registration_id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expiration_time: Option<OffsetDateTime>,
    pub tags: Vec<String>,
    /// Body template, only set on template registrations.
    pub template: Option<String>,
    /// Concurrency token to send back on update and delete.
    pub etag: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NormalizedRegistration {
    pub format: NotificationFormat,
    pub target: TargetPlatform,
    pub device: RegisteredDevice,
}

/// Content of a registration entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RegistrationContent {
    /// A platform description that has not been normalized yet.
    Raw(RawDescription),
    Normalized(NormalizedRegistration),
    /// The content holds no known platform description. Carries the name of its first element, if any.
    Unrecognized(Option<String>),
}

impl RegistrationContent {
    /// Converts a raw description into its canonical form.
    ///
    /// Normalized and unrecognized contents are left as they are, so calling this twice is harmless.
    pub fn normalize(&mut self) -> Result<(), DecodeError> {
        if let RegistrationContent::Raw(raw) = self {
            let normalized = normalize_description(raw)?;
            *self = RegistrationContent::Normalized(normalized);
        }
        Ok(())
    }

    pub fn registered_device(&self) -> Option<&RegisteredDevice> {
        match self {
            RegistrationContent::Normalized(v) => Some(&v.device),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<NotificationFormat> {
        match self {
            RegistrationContent::Normalized(v) => Some(v.format),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<TargetPlatform> {
        match self {
            RegistrationContent::Normalized(v) => Some(v.target),
            _ => None,
        }
    }
}

fn normalize_description(raw: &RawDescription) -> Result<NormalizedRegistration, DecodeError> {
    let kind = raw.kind;
    let device_id = raw.device_handle.clone().ok_or(DecodeError::MissingDeviceHandle {
        description: kind.element_name(),
        element: kind.device_handle_element(),
    })?;
    let expiration_time = raw.expiration_time.as_deref().map(parse_expiration_time).transpose()?;
    let tags = raw
        .tags
        .as_deref()
        .map(|v| v.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let template = if kind.is_template() {
        Some(raw.body_template.clone().unwrap_or_default())
    } else {
        None
    };
    Ok(NormalizedRegistration {
        format: kind.format(),
        target: kind.target(),
        device: RegisteredDevice {
            device_id,
            registration_id: raw.registration_id.clone().unwrap_or_default(),
            expiration_time,
            tags,
            template,
            etag: raw.etag.clone().unwrap_or_default(),
        },
    })
}

/// Parses an expiration time as forwarded by the hub.
///
/// The hub passes on the string it got from the platform, so it comes with or without the trailing `Z`.
/// Both are read as UTC.
pub(crate) fn parse_expiration_time(value: &str) -> Result<OffsetDateTime, DecodeError> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]Z"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            value,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| DecodeError::InvalidTimestamp {
        element: "ExpirationTime",
        value: value.to_string(),
    })
}

/// One registration entry of the hub.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct RegistrationResult {
    pub id: String,
    pub title: String,
    pub published: Option<OffsetDateTime>,
    pub updated: Option<OffsetDateTime>,
    pub content: Option<RegistrationContent>,
}

impl RegistrationResult {
    pub fn normalize(&mut self) -> Result<(), DecodeError> {
        match &mut self.content {
            Some(content) => content.normalize(),
            None => Ok(()),
        }
    }

    pub fn registered_device(&self) -> Option<&RegisteredDevice> {
        self.content.as_ref().and_then(RegistrationContent::registered_device)
    }
}

/// A feed of registration entries.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Registrations {
    pub id: String,
    pub title: String,
    pub updated: Option<OffsetDateTime>,
    pub entries: Vec<RegistrationResult>,
    /// Token to pass on the next list request to read the following page.
    pub continuation_token: Option<String>,
}

impl Registrations {
    /// Normalizes each entry independently, keeping their order.
    pub fn normalize(&mut self) -> Result<(), DecodeError> {
        self.entries.iter_mut().try_for_each(RegistrationResult::normalize)
    }
}

/// A registration of a device for notifications in one platform format.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Registration {
    pub device_id: String,
    pub expiration_time: Option<OffsetDateTime>,
    pub notification_format: NotificationFormat,
    /// Set to update an existing registration, leave empty to create one.
    pub registration_id: Option<String>,
    /// Comma separated tags.
    pub tags: String,
}

impl Registration {
    pub fn new(device_id: impl Into<String>, notification_format: NotificationFormat) -> Self {
        Self {
            device_id: device_id.into(),
            expiration_time: None,
            notification_format,
            registration_id: None,
            tags: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_registration_id(mut self, registration_id: impl Into<String>) -> Self {
        self.registration_id = Some(registration_id.into());
        self
    }

    pub fn with_expiration_time(mut self, expiration_time: OffsetDateTime) -> Self {
        self.expiration_time = Some(expiration_time);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), MultiError> {
        let mut errors = MultiError::new();
        validate_common(&mut errors, &self.device_id, &self.tags);
        if DescriptionKind::for_format(self.notification_format).is_none() {
            errors.add(ValidationError::new(
                "notification_format",
                "notification format not supported for registration",
                self.notification_format,
            ));
        }
        if errors.has_errors() {
            Err(errors)
        } else {
            Ok(())
        }
    }
}

/// A registration whose notifications are rendered from a template.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TemplateRegistration {
    pub device_id: String,
    pub expiration_time: Option<OffsetDateTime>,
    /// Set to update an existing registration, leave empty to create one.
    pub registration_id: Option<String>,
    /// Comma separated tags.
    pub tags: String,
    pub platform: TargetPlatform,
    /// Body template, using `$(name)` placeholders.
    pub template: String,
}

impl TemplateRegistration {
    pub fn new(device_id: impl Into<String>, platform: TargetPlatform, template: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            expiration_time: None,
            registration_id: None,
            tags: String::new(),
            platform,
            template: template.into(),
        }
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_registration_id(mut self, registration_id: impl Into<String>) -> Self {
        self.registration_id = Some(registration_id.into());
        self
    }

    pub fn with_expiration_time(mut self, expiration_time: OffsetDateTime) -> Self {
        self.expiration_time = Some(expiration_time);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), MultiError> {
        let mut errors = MultiError::new();
        validate_common(&mut errors, &self.device_id, &self.tags);
        if DescriptionKind::for_template_platform(self.platform).is_none() {
            errors.add(ValidationError::new(
                "platform",
                "platform not supported for template registration",
                self.platform,
            ));
        }
        if self.template.is_empty() {
            errors.add(ValidationError::new("template", "must not be empty", ""));
        }
        if errors.has_errors() {
            Err(errors)
        } else {
            Ok(())
        }
    }
}

fn validate_common(errors: &mut MultiError, device_id: &str, tags: &str) {
    if device_id.trim().is_empty() {
        errors.add(ValidationError::new("device_id", "must not be empty", device_id));
    }
    if tags.is_empty() {
        return;
    }
    for tag in tags.split(',') {
        if tag.is_empty() || tag.len() > MAX_TAG_LENGTH {
            errors.add(ValidationError::new(
                "tags",
                format!("tag must have between 1 and {MAX_TAG_LENGTH} characters"),
                tag,
            ));
        } else if !tag.chars().all(is_tag_char) {
            errors.add(ValidationError::new("tags", "tag contains an invalid character", tag));
        }
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '#' | '.' | ':' | '-')
}

/// Returns the registration id when it selects an update.
pub(crate) fn update_target(registration_id: &Option<String>) -> Option<&str> {
    registration_id.as_deref().filter(|id| !id.is_empty())
}
