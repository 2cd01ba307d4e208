//! 固定提示模板：规划与综合

/// 规划 system prompt：两种工具 + 两个示例，只允许输出 JSON
pub const PLAN_SYSTEM_PROMPT: &str = r#"Você é um planejador especialista de um assistente para criação de personagens, aventuras e cenários de RPG.
Sua tarefa é analisar o pedido do usuário e dividi-lo em uma lista de passos de pesquisa claros e objetivos, em formato JSON.

Você tem acesso a DUAS ferramentas:
1. `search_lore`: busca informações do universo do jogo (personagens, lugares, regras, história).
2. `search_web`: busca informações do mundo real (contexto histórico, científico, cultural).

Responda APENAS com o JSON: uma lista de objetos {"tool": ..., "query": ...}.

Exemplo 1:
- Pedido: "Crie um anão ferreiro de 80 anos em Vectora para Tormenta20."
- Sistema: "Tormenta20"
- JSON: [{"tool": "search_lore", "query": "Descrição da cidade de Vectora em Tormenta20"}, {"tool": "search_lore", "query": "Cultura e tradições dos anões em Tormenta20"}]

Exemplo 2:
- Pedido: "Crie um investigador no Brasil em 1943."
- Sistema: "Chamado de Cthulhu"
- JSON: [{"tool": "search_web", "query": "Contexto político e social do Brasil em 1943"}, {"tool": "search_web", "query": "Moda e costumes no Brasil em 1943"}]"#;

/// 综合 system prompt
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "Você é um nerd de RPG prestativo. Responda ao pedido do jogador de forma criativa e informativa, usando o contexto fornecido. Seja direto e organize a resposta de forma clara.";

/// 上下文块之间的分隔符
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub fn plan_user_prompt(request: &str, domain: &str) -> String {
    format!("Pedido: \"{}\"\nSistema: \"{}\"", request, domain)
}

pub fn context_block(query: &str, result: &str) -> String {
    format!("Resultado da pesquisa para '{}':\n{}", query, result)
}

pub fn synthesis_user_prompt(request: &str, context: &str) -> String {
    format!(
        "Pedido original do jogador: \"{}\"\n\n--- CONTEXTO COLETADO ---\n{}\n--- FIM DO CONTEXTO ---\n\nCom base no contexto acima, responda ao pedido original do jogador.",
        request, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::JSON_ONLY_MARKER;

    #[test]
    fn test_only_planning_prompt_asks_for_json() {
        assert!(PLAN_SYSTEM_PROMPT.contains(JSON_ONLY_MARKER));
        assert!(!SYNTHESIS_SYSTEM_PROMPT.contains(JSON_ONLY_MARKER));
    }
}
