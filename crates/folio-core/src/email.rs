//! Email syntax checking and canonicalisation.
//!
//! Addresses are stored in canonical form so that the same mailbox submitted
//! twice with different casing or sub-address tags reads back identically.

use std::str::FromStr;

use email_address::EmailAddress;

/// Longest local part permitted by RFC 5321.
const MAX_LOCAL_LEN: usize = 64;

/// Longest whole address that fits an RFC 5321 forward path.
const MAX_ADDRESS_LEN: usize = 254;

/// Whether `input` is an address we are willing to store.
///
/// On top of RFC 5322 parsing this requires a plain dotted hostname with an
/// alphabetic (or punycode) top-level label: no display text, no IP
/// literals, no single-label domains.
pub fn is_valid(input: &str) -> bool {
  if input.is_empty()
    || input.len() > MAX_ADDRESS_LEN
    || input.chars().any(|c| c.is_whitespace() || c == '<' || c == '>')
  {
    return false;
  }
  let Ok(parsed) = EmailAddress::from_str(input) else {
    return false;
  };
  parsed.local_part().len() <= MAX_LOCAL_LEN && is_hostname(parsed.domain())
}

fn is_hostname(domain: &str) -> bool {
  let labels: Vec<&str> = domain.split('.').collect();
  if labels.len() < 2 {
    return false;
  }
  let label_ok = |l: &&str| {
    !l.is_empty()
      && l.len() <= 63
      && !l.starts_with('-')
      && !l.ends_with('-')
      && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
  };
  if !labels.iter().all(label_ok) {
    return false;
  }
  let tld = labels[labels.len() - 1];
  tld.len() >= 2
    && (tld.chars().all(|c| c.is_ascii_alphabetic())
      || tld.to_ascii_lowercase().starts_with("xn--"))
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Mail providers whose sub-addressing rules we fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
  Gmail,
  Outlook,
  Yahoo,
  ICloud,
  Other,
}

const OUTLOOK_DOMAINS: &[&str] = &[
  "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il",
  "hotmail.co.nz", "hotmail.co.th", "hotmail.co.uk", "hotmail.com",
  "hotmail.com.ar", "hotmail.com.au", "hotmail.com.br", "hotmail.com.gr",
  "hotmail.com.mx", "hotmail.com.pe", "hotmail.com.tr", "hotmail.com.vn",
  "hotmail.cz", "hotmail.de", "hotmail.dk", "hotmail.es", "hotmail.fr",
  "hotmail.hu", "hotmail.id", "hotmail.ie", "hotmail.in", "hotmail.it",
  "hotmail.jp", "hotmail.kr", "hotmail.lv", "hotmail.my", "hotmail.ph",
  "hotmail.pt", "hotmail.sa", "hotmail.sg", "hotmail.sk", "live.be",
  "live.co.uk", "live.com", "live.com.ar", "live.com.mx", "live.de", "live.es",
  "live.eu", "live.fr", "live.it", "live.nl", "msn.com", "outlook.at",
  "outlook.be", "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th",
  "outlook.com", "outlook.com.ar", "outlook.com.au", "outlook.com.br",
  "outlook.com.gr", "outlook.com.pe", "outlook.com.tr", "outlook.com.vn",
  "outlook.cz", "outlook.de", "outlook.dk", "outlook.es", "outlook.fr",
  "outlook.hu", "outlook.id", "outlook.ie", "outlook.in", "outlook.it",
  "outlook.jp", "outlook.kr", "outlook.lv", "outlook.my", "outlook.ph",
  "outlook.pt", "outlook.sa", "outlook.sg", "outlook.sk", "passport.com",
];

const YAHOO_DOMAINS: &[&str] = &[
  "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de",
  "yahoo.fr", "yahoo.in", "yahoo.it", "ymail.com",
];

impl Provider {
  /// Exact-domain lookup. Lookalike hosts such as `yahoo.example.org` are
  /// [`Provider::Other`].
  fn of(domain: &str) -> Self {
    match domain {
      "gmail.com" | "googlemail.com" => Self::Gmail,
      "icloud.com" | "me.com" | "mac.com" => Self::ICloud,
      d if OUTLOOK_DOMAINS.contains(&d) => Self::Outlook,
      d if YAHOO_DOMAINS.contains(&d) => Self::Yahoo,
      _ => Self::Other,
    }
  }
}

/// Canonicalise a syntactically valid address.
///
/// The whole address is lowercased. Well-known providers additionally have
/// their sub-address tags removed (and, for Gmail, the dots in the local
/// part, with `googlemail.com` folded into `gmail.com`). Returns `None` if
/// folding leaves an empty local part, e.g. `+tag@gmail.com`.
pub fn normalize(address: &str) -> Option<String> {
  let (local, domain) = address.rsplit_once('@')?;
  let local = local.to_lowercase();
  let domain = domain.to_ascii_lowercase();

  let (local, domain) = match Provider::of(&domain) {
    Provider::Gmail => {
      let base = local.split('+').next().unwrap_or_default();
      (base.replace('.', ""), "gmail.com".to_owned())
    }
    Provider::Outlook | Provider::ICloud => {
      (local.split('+').next().unwrap_or_default().to_owned(), domain)
    }
    // Yahoo tags follow the last hyphen.
    Provider::Yahoo => {
      let base = match local.rsplit_once('-') {
        Some((base, _tag)) => base.to_owned(),
        None => local,
      };
      (base, domain)
    }
    Provider::Other => (local, domain),
  };

  if local.is_empty() {
    return None;
  }
  Some(format!("{local}@{domain}"))
}
