use std::fmt;
use std::str::FromStr;

use crate::http::error::ValidationError;

/// Encoding of a notification payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFormat {
    /// Platform independent payload rendered from a stored template.
    Template,
    /// Apple Push Notification service.
    Apple,
    /// Firebase Cloud Messaging HTTP v1.
    #[serde(rename = "fcmv1")]
    FcmV1,
    /// Baidu cloud push.
    Baidu,
    /// Amazon Device Messaging.
    #[serde(alias = "adm")]
    Kindle,
    /// Windows Push Notification Services.
    Windows,
    /// Microsoft Push Notification Service.
    #[serde(rename = "windowsphone")]
    WindowsPhone,
}

impl NotificationFormat {
    pub const ALL: [NotificationFormat; 7] = [
        NotificationFormat::Template,
        NotificationFormat::Apple,
        NotificationFormat::FcmV1,
        NotificationFormat::Baidu,
        NotificationFormat::Kindle,
        NotificationFormat::Windows,
        NotificationFormat::WindowsPhone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationFormat::Template => "template",
            NotificationFormat::Apple => "apple",
            NotificationFormat::FcmV1 => "fcmv1",
            NotificationFormat::Baidu => "baidu",
            NotificationFormat::Kindle => "kindle",
            NotificationFormat::Windows => "windows",
            NotificationFormat::WindowsPhone => "windowsphone",
        }
    }

    /// Content type of the payloads sent in this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            NotificationFormat::Windows | NotificationFormat::WindowsPhone => "application/xml",
            NotificationFormat::Template
            | NotificationFormat::Apple
            | NotificationFormat::FcmV1
            | NotificationFormat::Baidu
            | NotificationFormat::Kindle => "application/json",
        }
    }

    /// Returns `true` if `tag` names one of the known formats.
    pub fn is_valid(tag: &str) -> bool {
        tag.parse::<Self>().is_ok()
    }
}

impl fmt::Display for NotificationFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adm" => Ok(NotificationFormat::Kindle),
            _ => Self::ALL
                .into_iter()
                .find(|format| format.as_str() == s)
                .ok_or_else(|| ValidationError::new("notification_format", "unknown notification format", s)),
        }
    }
}

/// Kind of registration: a platform, optionally combined with a template.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Adm,
    AdmTemplate,
    Apple,
    AppleTemplate,
    Baidu,
    BaiduTemplate,
    #[serde(rename = "fcmv1")]
    FcmV1,
    #[serde(rename = "fcmv1template")]
    FcmV1Template,
    Template,
    Windows,
    WindowsTemplate,
    #[serde(rename = "windowsphone")]
    WindowsPhone,
    #[serde(rename = "windowsphonetemplate")]
    WindowsPhoneTemplate,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 13] = [
        TargetPlatform::Adm,
        TargetPlatform::AdmTemplate,
        TargetPlatform::Apple,
        TargetPlatform::AppleTemplate,
        TargetPlatform::Baidu,
        TargetPlatform::BaiduTemplate,
        TargetPlatform::FcmV1,
        TargetPlatform::FcmV1Template,
        TargetPlatform::Template,
        TargetPlatform::Windows,
        TargetPlatform::WindowsTemplate,
        TargetPlatform::WindowsPhone,
        TargetPlatform::WindowsPhoneTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPlatform::Adm => "adm",
            TargetPlatform::AdmTemplate => "admtemplate",
            TargetPlatform::Apple => "apple",
            TargetPlatform::AppleTemplate => "appletemplate",
            TargetPlatform::Baidu => "baidu",
            TargetPlatform::BaiduTemplate => "baidutemplate",
            TargetPlatform::FcmV1 => "fcmv1",
            TargetPlatform::FcmV1Template => "fcmv1template",
            TargetPlatform::Template => "template",
            TargetPlatform::Windows => "windows",
            TargetPlatform::WindowsTemplate => "windowstemplate",
            TargetPlatform::WindowsPhone => "windowsphone",
            TargetPlatform::WindowsPhoneTemplate => "windowsphonetemplate",
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(
            self,
            TargetPlatform::AdmTemplate
                | TargetPlatform::AppleTemplate
                | TargetPlatform::BaiduTemplate
                | TargetPlatform::FcmV1Template
                | TargetPlatform::Template
                | TargetPlatform::WindowsTemplate
                | TargetPlatform::WindowsPhoneTemplate
        )
    }

    /// Format of the notifications delivered to registrations of this kind.
    pub fn format(&self) -> NotificationFormat {
        match self {
            TargetPlatform::Adm => NotificationFormat::Kindle,
            TargetPlatform::Apple => NotificationFormat::Apple,
            TargetPlatform::Baidu => NotificationFormat::Baidu,
            TargetPlatform::FcmV1 => NotificationFormat::FcmV1,
            TargetPlatform::Windows => NotificationFormat::Windows,
            TargetPlatform::WindowsPhone => NotificationFormat::WindowsPhone,
            _ => NotificationFormat::Template,
        }
    }

    /// Returns `true` if `tag` names one of the known platforms.
    pub fn is_valid(tag: &str) -> bool {
        tag.parse::<Self>().is_ok()
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPlatform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str() == s)
            .ok_or_else(|| ValidationError::new("platform", "unknown target platform", s))
    }
}
