use std::{collections::HashMap, fs, path::{Path, PathBuf}};
use tracing::{debug, warn};
use crate::web::WebError;
use super::SecretProvider;

/// .htpasswd 파일에서 읽은 사용자/비밀값 목록
///
/// # 예시
/// ```text
/// # .htpasswd 파일 형식 (비밀번호는 모두 "hello")
/// alice:{SHA}qvTGHdzF6KLavt4PO0gs2a6pQ00=
/// bob:$apr1$a0j62R97$CmCSzMOCTKR9qlMaLtgD3.
/// ```
#[derive(Debug, Clone)]
pub struct HtpasswdFile {
    path: PathBuf,
    users: HashMap<String, String>,
}

impl HtpasswdFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WebError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|e| WebError::Htpasswd {
            path: path.clone(),
            source: e,
        })?;

        let users = parse(&content);
        debug!(path = %path.display(), users = users.len(), "htpasswd 파일 로드");

        Ok(Self { path, users })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn secret(&self, user: &str) -> Option<&str> {
        self.users.get(user).map(String::as_str)
    }

    pub fn into_provider(self) -> SecretProvider {
        SecretProvider::from_users(self.users)
    }
}

fn parse(content: &str) -> HashMap<String, String> {
    let mut users = HashMap::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once(':') {
            Some((username, secret)) if !username.is_empty() => {
                users.insert(username.to_string(), secret.to_string());
            }
            _ => warn!(line = lineno + 1, "htpasswd 항목 형식 오류, 무시함"),
        }
    }

    users
}
