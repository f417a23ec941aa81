//! User-facing strings and the system prompt.
//!
//! Texts marked HTML are sent with Telegram's HTML parse mode; everything
//! else goes out as plain text.

pub const SYSTEM_PROMPT: &str = "\
Você é o Assistente ADS, um chatbot educacional criado para apoiar estudantes de Análise e Desenvolvimento de Sistemas (ADS).
Seu objetivo é fornecer respostas técnicas e precisas sobre temas relacionados ao curso, promovendo o aprendizado interativo.

🎯 Objetivo Principal:
- Auxiliar estudantes de ADS na compreensão de conceitos técnicos.
- Responder dúvidas sobre programação, banco de dados, engenharia de software e análise de sistemas.
- Servir como estudo de caso para implementação de IA em ambientes educacionais.

🛠️ Funcionalidades:
✅ Respostas técnicas sobre linguagens de programação (Python, Java, C#, etc.).
✅ Explicações sobre banco de dados (SQL, NoSQL) e modelagem de dados.
✅ Suporte para redes de computadores e segurança da informação.
✅ Informações sobre desenvolvimento de software e boas práticas.
✅ Breves comentários descontraídos ao final das respostas para manter o tom de humor e amigável. 🤖✨
";

/// HTML.
pub const WELCOME: &str = "\
👋 Olá! Seja bem-vindo ao <b>Assistente ADS</b>, seu bot educacional para dúvidas de <b>Análise e Desenvolvimento de Sistemas</b>!

📘 Aqui você pode:
✅ Tirar dúvidas sobre programação, banco de dados, redes e muito mais!

📌 /sobre - Informações do projeto
📌 /tcc - Regras e prazos do TCC
📌 /reset - Refazer o cadastro";

/// HTML.
pub const ABOUT: &str = "\
🎓 Projeto de TCC - ADS
Desenvolvido por: Francisco F. Dantas
Orientação: Prof. Nilton Mattos
Entrega: Junho/2025

Tecnologias: Telegram API, OpenRouter AI, AWS Cloud
GitHub: https://github.com/frncisc0";

/// HTML.
pub const TCC_INFO: &str = "\
📘 TCC - Informações Oficiais
Prazo Final: 10/06/2025
📄 Documentação oficial: <a href=\"https://link-para-documento.pdf\">Clique aqui para baixar</a>
👨‍🏫 Orientador: Prof. Nilton";

pub const ASK_NAME: &str = "Olá! Qual o seu nome?";
pub const INVALID_NAME: &str = "Nome inválido. Por favor, use apenas letras e espaços:";
pub const INVALID_ID: &str = "RA inválido. Use de 4 a 20 letras ou dígitos, incluindo ao menos um número:";
pub const REGISTERED: &str = "✅ Cadastro realizado com sucesso!";
pub const RESET_DONE: &str = "🔄 Cadastro apagado. Vamos começar de novo.";
pub const CANCELLED: &str = "❌ Cadastro cancelado.";
pub const NOTHING_TO_CANCEL: &str = "Não há cadastro em andamento.";
pub const START_REGISTRATION: &str = "📝 Antes de tirar dúvidas, preciso fazer o seu cadastro.";

pub const THINKING: &str = "🤖 Processando sua dúvida com inteligência artificial...";
pub const FOLLOW_UP: &str = "📚 Espero ter ajudado! Me mande outra dúvida se quiser.";

pub const AI_FAILED: &str = "❌ Não foi possível obter uma resposta agora. Tente novamente.";
pub const STORAGE_FAILED: &str = "⚠️ Não consegui acessar o cadastro agora. Tente novamente em instantes.";

pub const STATUS_DB_DOWN: &str = "⚠️ Problema ao conectar com o banco de dados.";

pub fn ask_academic_id(name: &str) -> String {
    format!("Legal, {name}! Agora me diga seu RA:")
}

pub fn greeting(name: &str) -> String {
    format!(
        "👋 Assistente ADS - Olá {name}! Como posso ajudar?\n\n\
         📌 Use os comandos:\n/start - Início\n/sobre - Sobre o projeto\n/tcc - Informações do TCC\n/reset - Refazer o cadastro"
    )
}

pub fn status_ok(answered: u64) -> String {
    format!("✅ Bot funcionando normalmente e conectado ao banco de dados.\n📊 Dúvidas respondidas neste chat: {answered}")
}
