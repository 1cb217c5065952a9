//! Catálogo imutável de erros do motor de curva.
use core::fmt;

/// Código de erro do motor.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum EngineErrorCode {
    /// Operações com montante de entrada zero.
    ZeroAmount,
    /// Reservas ou supply não inicializados.
    ZeroReserve,
    /// Peso da reserva fora do domínio (0, 1e6].
    InvalidWeight,
    /// Slope zerado na configuração.
    InvalidSlope,
    /// Referência de ativo inválida (emitido == reserva).
    InvalidToken,
    /// Pool inexistente no registry.
    PoolNotFound,
    /// Saída computada excede a reserva disponível.
    InsufficientLiquidity,
    /// Burn de shares acima do saldo do provedor.
    InsufficientShares,
    /// Trade válido cujo retorno arredonda para zero.
    ZeroReturnAmount,
    /// Divisor zero em caminho aritmético.
    DivisionByZero,
    /// Logaritmo/potência de argumento fora do domínio.
    DomainError,
    /// Overflow ou underflow em cálculos numéricos.
    Overflow,
    /// Saldo insuficiente no ledger externo.
    InsufficientBalance,
    /// Allowance insuficiente no ledger externo.
    InsufficientAllowance,
    /// Ledger externo rejeitou a operação.
    LedgerRejected,
    /// Chamador sem o papel exigido.
    NotAuthorized,
    /// Reentrada na mesma pool com operação em andamento.
    PoolLocked,
}

impl EngineErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "CRV-0001",
            Self::ZeroReserve => "CRV-0002",
            Self::InvalidWeight => "CRV-0003",
            Self::InvalidSlope => "CRV-0004",
            Self::InvalidToken => "CRV-0005",
            Self::PoolNotFound => "CRV-0006",
            Self::InsufficientLiquidity => "CRV-0007",
            Self::InsufficientShares => "CRV-0008",
            Self::ZeroReturnAmount => "CRV-0009",
            Self::DivisionByZero => "CRV-0010",
            Self::DomainError => "CRV-0011",
            Self::Overflow => "CRV-0012",
            Self::InsufficientBalance => "CRV-0013",
            Self::InsufficientAllowance => "CRV-0014",
            Self::LedgerRejected => "CRV-0015",
            Self::NotAuthorized => "CRV-0016",
            Self::PoolLocked => "CRV-0017",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "Quantidade zerada",
            Self::ZeroReserve => "Reserva zerada",
            Self::InvalidWeight => "Peso inválido",
            Self::InvalidSlope => "Slope inválido",
            Self::InvalidToken => "Token inválido",
            Self::PoolNotFound => "Pool inexistente",
            Self::InsufficientLiquidity => "Liquidez insuficiente",
            Self::InsufficientShares => "Shares insuficientes",
            Self::ZeroReturnAmount => "Retorno zerado",
            Self::DivisionByZero => "Divisão por zero",
            Self::DomainError => "Fora do domínio",
            Self::Overflow => "Overflow numérico",
            Self::InsufficientBalance => "Saldo insuficiente",
            Self::InsufficientAllowance => "Allowance insuficiente",
            Self::LedgerRejected => "Ledger rejeitou",
            Self::NotAuthorized => "Não autorizado",
            Self::PoolLocked => "Pool travada",
        }
    }

    /// Mensagem base em português.
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "amount deve ser > 0",
            Self::ZeroReserve => "supply e reserve devem ser > 0",
            Self::InvalidWeight => "peso deve estar em (0, 1e6] ppm",
            Self::InvalidSlope => "slope deve ser > 0",
            Self::InvalidToken => "token emitido e ativo de reserva devem ser distintos",
            Self::PoolNotFound => "pool {pool} não existe",
            Self::InsufficientLiquidity => "reserva disponível não cobre a saída",
            Self::InsufficientShares => "shares pedidos excedem o saldo",
            Self::ZeroReturnAmount => "retorno do trade arredonda para zero",
            Self::DivisionByZero => "divisor zero em caminho aritmético",
            Self::DomainError => "ln/pow exige argumento positivo",
            Self::Overflow => "overflow/underflow numérico",
            Self::InsufficientBalance => "saldo no ledger não cobre {amount}",
            Self::InsufficientAllowance => "allowance no ledger não cobre {amount}",
            Self::LedgerRejected => "ledger externo abortou a operação",
            Self::NotAuthorized => "chamador {caller} sem o papel exigido",
            Self::PoolLocked => "pool {pool} com operação em andamento",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [EngineErrorCode] {
        const ALL: &[EngineErrorCode] = &[
            EngineErrorCode::ZeroAmount,
            EngineErrorCode::ZeroReserve,
            EngineErrorCode::InvalidWeight,
            EngineErrorCode::InvalidSlope,
            EngineErrorCode::InvalidToken,
            EngineErrorCode::PoolNotFound,
            EngineErrorCode::InsufficientLiquidity,
            EngineErrorCode::InsufficientShares,
            EngineErrorCode::ZeroReturnAmount,
            EngineErrorCode::DivisionByZero,
            EngineErrorCode::DomainError,
            EngineErrorCode::Overflow,
            EngineErrorCode::InsufficientBalance,
            EngineErrorCode::InsufficientAllowance,
            EngineErrorCode::LedgerRejected,
            EngineErrorCode::NotAuthorized,
            EngineErrorCode::PoolLocked,
        ];
        ALL
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: EngineErrorCode) -> &'static str {
    code.message_pt()
}
