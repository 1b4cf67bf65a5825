use rand::Rng;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

/// Codes are valid for five minutes from issuance.
pub const OTP_EXPIRY_MINUTES: i64 = 5;

fn format_code(n: u32) -> String {
    format!("{:06}", n)
}

/// Uniformly random 6-digit code. Leading zeros are allowed, so the code
/// is always handled as a fixed-width string.
pub fn generate_code(rng: &mut impl Rng) -> String {
    format_code(rng.gen_range(0..1_000_000))
}

/// Issue a fresh code for `email`, invalidating any prior codes first.
///
/// The delete/insert pair is not transactional: two concurrent issues for
/// the same email can briefly leave two valid codes. Accepted, given the
/// short validity window.
pub async fn issue(db: &PgPool, email: &str) -> anyhow::Result<String> {
    let code = generate_code(&mut rand::thread_rng());
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(OTP_EXPIRY_MINUTES);

    sqlx::query("DELETE FROM otp_verifications WHERE email = $1")
        .bind(email)
        .execute(db)
        .await?;
    sqlx::query("INSERT INTO otp_verifications (email, otp, expires_at) VALUES ($1, $2, $3)")
        .bind(email)
        .bind(&code)
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok(code)
}

/// Consume a code: succeeds only for an unexpired exact match, and on
/// success removes every outstanding code for the email.
pub async fn consume(db: &PgPool, email: &str, code: &str) -> anyhow::Result<bool> {
    let matched = sqlx::query(
        "DELETE FROM otp_verifications WHERE email = $1 AND otp = $2 AND expires_at > now()",
    )
    .bind(email)
    .bind(code)
    .execute(db)
    .await?;

    if matched.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("DELETE FROM otp_verifications WHERE email = $1")
        .bind(email)
        .execute(db)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed_width_strings() {
        assert_eq!(format_code(42), "000042");
        assert_eq!(format_code(0), "000000");
        assert_eq!(format_code(999_999), "999999");
    }

    #[test]
    fn generated_codes_are_six_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
